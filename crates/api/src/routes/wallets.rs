//! Wallet routes: registration, balance adjustments and transfers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use webbudget_core::financial::WalletBalance;
use webbudget_core::registration::{Wallet, WalletType};
use webbudget_core::ui::ViewState;
use webbudget_db::WalletRepository;
use webbudget_shared::types::{PageRequest, PageResponse};

const FUNCTIONALITY: &str = "wallet";

/// Creates the wallet routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallets", get(list_wallets).post(create_wallet))
        .route("/wallets/transfer", post(transfer))
        .route(
            "/wallets/{id}",
            get(get_wallet).put(update_wallet).delete(delete_wallet),
        )
        .route("/wallets/{id}/adjust", post(adjust_balance))
        .route("/wallets/{id}/balances", get(list_balances))
}

/// Query parameters for listing wallets.
#[derive(Debug, Deserialize)]
pub struct ListWalletsQuery {
    /// Only list active wallets.
    #[serde(default)]
    pub active: bool,
}

/// Request body for creating or updating a wallet.
#[derive(Debug, Deserialize, Validate)]
pub struct WalletRequest {
    /// Wallet name.
    #[validate(length(min = 1, max = 90))]
    pub name: String,
    /// `personal`, `bank` or `investment`.
    #[serde(rename = "type")]
    pub wallet_type: WalletType,
    /// Bank name, required for bank wallets.
    #[validate(length(max = 90))]
    pub bank: Option<String>,
    /// Bank agency.
    #[validate(length(max = 10))]
    pub agency: Option<String>,
    /// Bank account.
    #[validate(length(max = 45))]
    pub account: Option<String>,
    /// Free description.
    #[validate(length(max = 255))]
    pub description: Option<String>,
    /// Starting balance, only honored on creation.
    #[serde(default)]
    pub initial_balance: Decimal,
    /// Inactive wallets cannot receive payments.
    #[serde(default = "active_default")]
    pub active: bool,
}

const fn active_default() -> bool {
    true
}

impl WalletRequest {
    fn apply(self, wallet: &mut Wallet) {
        wallet.name = self.name;
        wallet.wallet_type = self.wallet_type;
        wallet.bank = self.bank;
        wallet.agency = self.agency;
        wallet.account = self.account;
        wallet.description = self.description;
        wallet.active = self.active;
    }
}

/// Request body for adjusting a wallet balance.
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustBalanceRequest {
    /// Balance the wallet should have afterwards.
    pub balance: Decimal,
    /// Reason for the adjustment.
    #[validate(length(max = 255))]
    pub observations: Option<String>,
}

/// Request body for a transfer between wallets.
#[derive(Debug, Deserialize, Validate)]
pub struct TransferRequest {
    /// Wallet the value leaves.
    pub source_id: Uuid,
    /// Wallet the value enters.
    pub target_id: Uuid,
    /// Transferred value, must be positive.
    pub value: Decimal,
    /// Free observations stored on both balances.
    #[validate(length(max = 255))]
    pub observations: Option<String>,
}

/// Response for a transfer: the balance recorded on each side.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// Debit on the source wallet.
    pub source: WalletBalance,
    /// Credit on the target wallet.
    pub target: WalletBalance,
}

/// GET /wallets - List wallets.
async fn list_wallets(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListWalletsQuery>,
) -> ApiResult<Json<Vec<Wallet>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    Ok(Json(WalletRepository::new(state.conn()).list(query.active).await?))
}

/// GET /wallets/{id} - Get a single wallet.
async fn get_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Wallet>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    WalletRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Wallet"))
}

/// POST /wallets - Create a wallet, recording any initial balance.
async fn create_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<WalletRequest>,
) -> ApiResult<(StatusCode, Json<Wallet>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    payload.validate()?;

    let mut wallet = Wallet::new(String::new(), payload.wallet_type);
    wallet.actual_balance = payload.initial_balance;
    payload.apply(&mut wallet);

    let saved = WalletRepository::new(state.conn()).save(&wallet).await?;
    info!(user_id = %auth.user_id(), wallet_id = %saved.id, "Wallet created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /wallets/{id} - Update wallet data; the balance is left alone.
async fn update_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<WalletRequest>,
) -> ApiResult<Json<Wallet>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    payload.validate()?;

    let repo = WalletRepository::new(state.conn());
    let mut wallet = repo
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Wallet"))?;
    payload.apply(&mut wallet);
    Ok(Json(repo.save(&wallet).await?))
}

/// DELETE /wallets/{id} - Delete an unused wallet.
async fn delete_wallet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    WalletRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), wallet_id = %id, "Wallet deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /wallets/{id}/adjust - Set the balance, recording an adjustment.
async fn adjust_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustBalanceRequest>,
) -> ApiResult<(StatusCode, Json<WalletBalance>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    payload.validate()?;

    let balance = WalletRepository::new(state.conn())
        .adjust_balance(id, payload.balance, payload.observations)
        .await?;
    Ok((StatusCode::CREATED, Json(balance)))
}

/// POST /wallets/transfer - Move value between two wallets.
async fn transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TransferRequest>,
) -> ApiResult<(StatusCode, Json<TransferResponse>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    payload.validate()?;

    let (source, target) = WalletRepository::new(state.conn())
        .transfer(
            payload.source_id,
            payload.target_id,
            payload.value,
            payload.observations,
        )
        .await?;
    info!(user_id = %auth.user_id(), "Transfer between wallets recorded");
    Ok((StatusCode::CREATED, Json(TransferResponse { source, target })))
}

/// GET /wallets/{id}/balances - One page of balance history, newest first.
async fn list_balances(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<WalletBalance>>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    let repo = WalletRepository::new(state.conn());
    if repo.find(id).await?.is_none() {
        return Err(ApiError::not_found("Wallet"));
    }
    Ok(Json(repo.list_balances(id, &page).await?))
}
