//! Fixed movement routes: recurring movements and their launches.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    routes::movements::MovementRequest,
};
use webbudget_core::financial::{FixedMovement, Launch};
use webbudget_core::ui::ViewState;
use webbudget_db::FixedMovementRepository;

const FUNCTIONALITY: &str = "fixed-movement";

/// Creates the fixed movement routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/fixed-movements",
            get(list_fixed_movements).post(create_fixed_movement),
        )
        .route(
            "/fixed-movements/{id}",
            get(get_fixed_movement)
                .put(update_fixed_movement)
                .delete(delete_fixed_movement),
        )
        .route(
            "/fixed-movements/{id}/launches",
            get(list_launches).post(launch),
        )
}

/// Query parameters for listing fixed movements.
#[derive(Debug, Deserialize)]
pub struct ListFixedMovementsQuery {
    /// Only list active fixed movements.
    #[serde(default)]
    pub active: bool,
}

/// Request body for creating or updating a fixed movement.
#[derive(Debug, Deserialize, Validate)]
pub struct FixedMovementRequest {
    /// Movement fields.
    #[serde(flatten)]
    pub movement: MovementRequest,
    /// Date the recurrence starts; its day of month is the due day.
    pub start_date: NaiveDate,
    /// Number of quotes, undetermined when omitted.
    #[validate(range(min = 1))]
    pub total_quotes: Option<i32>,
    /// Quote the next launch starts counting from.
    #[serde(default = "first_quote")]
    #[validate(range(min = 1))]
    pub starting_quote: i32,
    /// Launch automatically when a period is created.
    #[serde(default)]
    pub auto_launch: bool,
}

const fn first_quote() -> i32 {
    1
}

/// Request body for launching a fixed movement.
#[derive(Debug, Deserialize)]
pub struct LaunchRequest {
    /// Period receiving the launch.
    pub financial_period_id: Uuid,
}

impl FixedMovementRequest {
    async fn into_fixed(
        self,
        state: &AppState,
        existing: Option<FixedMovement>,
    ) -> ApiResult<FixedMovement> {
        self.validate()?;
        let movement = self
            .movement
            .into_movement(state, existing.as_ref().map(|f| &f.movement))
            .await?;
        let mut fixed = match existing {
            Some(mut fixed) => {
                fixed.movement = movement;
                fixed.start_date = self.start_date;
                fixed
            }
            None => FixedMovement::new(movement, self.start_date),
        };
        fixed.total_quotes = self.total_quotes;
        fixed.starting_quote = self.starting_quote;
        fixed.auto_launch = self.auto_launch;
        Ok(fixed)
    }
}

/// GET /fixed-movements - List fixed movements.
async fn list_fixed_movements(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListFixedMovementsQuery>,
) -> ApiResult<Json<Vec<FixedMovement>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let repo = FixedMovementRepository::new(state.conn());
    Ok(Json(repo.list(query.active).await?))
}

/// GET /fixed-movements/{id} - Get a single fixed movement.
async fn get_fixed_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FixedMovement>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    FixedMovementRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Fixed movement"))
}

/// POST /fixed-movements - Create a fixed movement.
async fn create_fixed_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<FixedMovementRequest>,
) -> ApiResult<(StatusCode, Json<FixedMovement>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    let fixed = payload.into_fixed(&state, None).await?;
    let created = FixedMovementRepository::new(state.conn())
        .create(fixed)
        .await?;
    info!(user_id = %auth.user_id(), code = %created.movement.code, "Fixed movement created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /fixed-movements/{id} - Update an active fixed movement.
async fn update_fixed_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FixedMovementRequest>,
) -> ApiResult<Json<FixedMovement>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    let repo = FixedMovementRepository::new(state.conn());
    let existing = repo
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Fixed movement"))?;
    let changes = payload.into_fixed(&state, Some(existing)).await?;
    Ok(Json(repo.update(id, changes).await?))
}

/// DELETE /fixed-movements/{id} - Delete a fixed movement, keeping launched movements.
async fn delete_fixed_movement(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    FixedMovementRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), fixed_movement_id = %id, "Fixed movement deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /fixed-movements/{id}/launches - Launch history, oldest first.
async fn list_launches(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Launch>>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    let repo = FixedMovementRepository::new(state.conn());
    if repo.find(id).await?.is_none() {
        return Err(ApiError::not_found("Fixed movement"));
    }
    Ok(Json(repo.list_launches(id).await?))
}

/// POST /fixed-movements/{id}/launches - Launch the next quote into a period.
async fn launch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<LaunchRequest>,
) -> ApiResult<(StatusCode, Json<Launch>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    let launch = FixedMovementRepository::new(state.conn())
        .launch(id, payload.financial_period_id)
        .await?;
    info!(
        user_id = %auth.user_id(),
        fixed_movement_id = %id,
        quote = ?launch.quote_number,
        "Fixed movement launched"
    );
    Ok((StatusCode::CREATED, Json(launch)))
}
