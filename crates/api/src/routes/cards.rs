//! Card routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use webbudget_core::registration::{Card, CardType};
use webbudget_core::ui::ViewState;
use webbudget_db::CardRepository;

const FUNCTIONALITY: &str = "card";

/// Creates the card routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cards", get(list_cards).post(create_card))
        .route(
            "/cards/{id}",
            get(get_card).put(update_card).delete(delete_card),
        )
}

/// Query parameters for listing cards.
#[derive(Debug, Deserialize)]
pub struct ListCardsQuery {
    /// Filter by `credit` or `debit`.
    #[serde(rename = "type")]
    pub card_type: Option<CardType>,
}

/// Request body for creating or updating a card.
#[derive(Debug, Deserialize, Validate)]
pub struct CardRequest {
    /// Card name.
    #[validate(length(min = 1, max = 90))]
    pub name: String,
    /// Card brand.
    #[validate(length(max = 45))]
    pub flag: Option<String>,
    /// `credit` or `debit`.
    #[serde(rename = "type")]
    pub card_type: CardType,
    /// Credit limit, credit cards only.
    #[serde(default)]
    pub credit_limit: Decimal,
    /// Invoice expiration day of month.
    #[serde(default = "expiration_default")]
    pub expiration_day: i16,
    /// Inactive cards cannot pay.
    #[serde(default = "active_default")]
    pub active: bool,
    /// Wallet a debit card draws from.
    pub wallet_id: Option<Uuid>,
}

const fn expiration_default() -> i16 {
    1
}

const fn active_default() -> bool {
    true
}

impl CardRequest {
    fn into_card(self, id: Uuid) -> Card {
        Card {
            id,
            name: self.name,
            flag: self.flag,
            card_type: self.card_type,
            credit_limit: self.credit_limit,
            expiration_day: self.expiration_day,
            active: self.active,
            wallet_id: self.wallet_id,
        }
    }
}

/// GET /cards - List cards.
async fn list_cards(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListCardsQuery>,
) -> ApiResult<Json<Vec<Card>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    Ok(Json(CardRepository::new(state.conn()).list(query.card_type).await?))
}

/// GET /cards/{id} - Get a single card.
async fn get_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Card>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    CardRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Card"))
}

/// POST /cards - Create a card.
async fn create_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CardRequest>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    payload.validate()?;

    let card = payload.into_card(Uuid::now_v7());
    let saved = CardRepository::new(state.conn()).save(&card).await?;
    info!(user_id = %auth.user_id(), card_id = %saved.id, "Card created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /cards/{id} - Update a card.
async fn update_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CardRequest>,
) -> ApiResult<Json<Card>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    payload.validate()?;

    let repo = CardRepository::new(state.conn());
    if repo.find(id).await?.is_none() {
        return Err(ApiError::not_found("Card"));
    }
    Ok(Json(repo.save(&payload.into_card(id)).await?))
}

/// DELETE /cards/{id} - Delete a card never used in a payment.
async fn delete_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    CardRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), card_id = %id, "Card deleted");
    Ok(StatusCode::NO_CONTENT)
}
