//! Period movement routes: CRUD, payment and payment reversal.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
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
use webbudget_core::financial::{
    Apportionment, Movement, MovementState, Payment, PaymentMethod, PeriodMovement,
};
use webbudget_core::ui::ViewState;
use webbudget_db::{
    CardRepository, CostCenterRepository, MovementClassRepository, MovementRepository,
};
use webbudget_shared::types::{PageRequest, PageResponse};

const FUNCTIONALITY: &str = "period-movement";

/// Creates the period movement routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movements", get(list_movements).post(create_movement))
        .route(
            "/movements/{id}",
            get(get_movement).put(update_movement).delete(delete_movement),
        )
        .route(
            "/movements/{id}/payment",
            post(pay_movement).delete(revert_payment),
        )
}

/// Query parameters for listing period movements.
#[derive(Debug, Deserialize)]
pub struct ListMovementsQuery {
    /// Filter by financial period.
    pub period_id: Option<Uuid>,
    /// Filter by `open`, `paid` or `accounted`.
    pub state: Option<MovementState>,
}

/// One apportionment of a movement request.
#[derive(Debug, Deserialize, Validate)]
pub struct ApportionmentRequest {
    /// ID of a saved apportionment being kept.
    pub id: Option<Uuid>,
    /// Apportioned value.
    pub value: Decimal,
    /// Class the value is booked under.
    pub movement_class_id: Uuid,
    /// Cost center charged; the class's one when omitted.
    pub cost_center_id: Option<Uuid>,
}

/// Fields shared by period and fixed movement requests.
#[derive(Debug, Deserialize, Validate)]
pub struct MovementRequest {
    /// Short identification.
    #[validate(length(min = 1, max = 90))]
    pub identification: String,
    /// Free description.
    #[validate(length(max = 255))]
    pub description: Option<String>,
    /// Total value.
    pub value: Decimal,
    /// Free-text contact.
    #[validate(length(max = 90))]
    pub contact: Option<String>,
    /// How the value is split between classes.
    #[validate(nested)]
    pub apportionments: Vec<ApportionmentRequest>,
}

impl MovementRequest {
    /// Builds the domain movement, resolving class and cost center references.
    ///
    /// Apportionments naming an ID not in `existing` are treated as new.
    pub(crate) async fn into_movement(
        self,
        state: &AppState,
        existing: Option<&Movement>,
    ) -> ApiResult<Movement> {
        self.validate()?;

        let class_ids: Vec<Uuid> = self
            .apportionments
            .iter()
            .map(|a| a.movement_class_id)
            .collect();
        let classes = MovementClassRepository::new(state.conn())
            .find_refs(&class_ids)
            .await?;

        let cost_center_repo = CostCenterRepository::new(state.conn());
        let mut centers: HashMap<Uuid, webbudget_core::registration::CostCenterRef> = HashMap::new();

        let mut movement = match existing {
            Some(existing) => {
                let mut movement = existing.clone();
                movement.apportionments.clear();
                movement.deleted_apportionments.clear();
                movement
            }
            None => Movement::new(String::new(), Decimal::ZERO),
        };
        movement.identification = self.identification;
        movement.description = self.description;
        movement.value = self.value;
        movement.contact = self.contact;

        for request in self.apportionments {
            let class = classes
                .get(&request.movement_class_id)
                .cloned()
                .ok_or_else(|| ApiError::not_found("Movement class"))?;

            let mut apportionment = match request.cost_center_id {
                Some(cost_center_id) if cost_center_id != class.cost_center.id => {
                    let cost_center = match centers.get(&cost_center_id) {
                        Some(cost_center) => cost_center.clone(),
                        None => {
                            let cost_center = cost_center_repo
                                .find(cost_center_id)
                                .await?
                                .ok_or_else(|| ApiError::not_found("Cost center"))?
                                .to_ref();
                            centers.insert(cost_center_id, cost_center.clone());
                            cost_center
                        }
                    };
                    Apportionment::with_cost_center(request.value, cost_center, class)
                }
                _ => Apportionment::new(request.value, class),
            };

            let saved = request.id.and_then(|id| {
                existing.and_then(|m| m.apportionments.iter().find(|a| a.id == Some(id)))
            });
            if let Some(saved) = saved {
                apportionment.id = saved.id;
                apportionment.code.clone_from(&saved.code);
            }
            movement.add(apportionment);
        }
        Ok(movement)
    }
}

/// Request body for creating or updating a period movement.
#[derive(Debug, Deserialize)]
pub struct PeriodMovementRequest {
    /// Movement fields.
    #[serde(flatten)]
    pub movement: MovementRequest,
    /// Due date.
    pub due_date: NaiveDate,
    /// Period the movement belongs to.
    pub financial_period_id: Uuid,
}

/// Request body for paying a movement.
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    /// Payment date.
    pub paid_on: NaiveDate,
    /// Discount subtracted from the movement value.
    #[serde(default)]
    pub discount: Decimal,
    /// `cash`, `credit_card` or `debit_card`.
    pub payment_method: PaymentMethod,
    /// Card used, for card payments.
    pub card_id: Option<Uuid>,
    /// Wallet used, for cash payments.
    pub wallet_id: Option<Uuid>,
}

/// GET /movements - One page of period movements by due date.
async fn list_movements(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListMovementsQuery>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<PeriodMovement>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let repo = MovementRepository::new(state.conn());
    Ok(Json(repo.list(query.period_id, query.state, &page).await?))
}

/// GET /movements/{id} - Get a movement with apportionments and payment.
async fn get_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PeriodMovement>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    MovementRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Movement"))
}

/// POST /movements - Create an open movement.
async fn create_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<PeriodMovementRequest>,
) -> ApiResult<(StatusCode, Json<PeriodMovement>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    let movement = payload.movement.into_movement(&state, None).await?;
    let movement = PeriodMovement::new(movement, payload.financial_period_id, payload.due_date);

    let created = MovementRepository::new(state.conn()).create(movement).await?;
    info!(user_id = %auth.user_id(), code = %created.movement.code, "Movement created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /movements/{id} - Update an open movement.
async fn update_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PeriodMovementRequest>,
) -> ApiResult<Json<PeriodMovement>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    let repo = MovementRepository::new(state.conn());
    let existing = repo
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Movement"))?;
    existing.ensure_editable()?;

    let movement = payload
        .movement
        .into_movement(&state, Some(&existing.movement))
        .await?;
    let changes = PeriodMovement::new(movement, payload.financial_period_id, payload.due_date);
    Ok(Json(repo.update(id, changes).await?))
}

/// DELETE /movements/{id} - Delete an open movement.
async fn delete_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    MovementRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), movement_id = %id, "Movement deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /movements/{id}/payment - Pay an open movement.
async fn pay_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentRequest>,
) -> ApiResult<Json<PeriodMovement>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    payload.validate()?;

    let mut payment = Payment::new(payload.paid_on);
    payment.discount = payload.discount;
    payment.payment_method = payload.payment_method;
    payment.wallet_id = payload.wallet_id;
    if let Some(card_id) = payload.card_id {
        payment.card = Some(CardRepository::new(state.conn()).find_ref(card_id).await?);
    }

    let paid = MovementRepository::new(state.conn()).pay(id, payment).await?;
    info!(user_id = %auth.user_id(), movement_id = %id, "Movement paid");
    Ok(Json(paid))
}

/// DELETE /movements/{id}/payment - Revert the payment of a paid movement.
async fn revert_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PeriodMovement>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    let reopened = MovementRepository::new(state.conn())
        .revert_payment(id)
        .await?;
    info!(user_id = %auth.user_id(), movement_id = %id, "Payment reverted");
    Ok(Json(reopened))
}
