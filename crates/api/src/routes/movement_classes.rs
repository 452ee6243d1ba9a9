//! Movement class routes.

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
use webbudget_core::registration::{CostCenterRef, MovementClass, MovementClassType};
use webbudget_core::ui::ViewState;
use webbudget_db::{CostCenterRepository, MovementClassRepository};

const FUNCTIONALITY: &str = "movement-class";

/// Creates the movement class routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/movement-classes",
            get(list_movement_classes).post(create_movement_class),
        )
        .route(
            "/movement-classes/{id}",
            get(get_movement_class)
                .put(update_movement_class)
                .delete(delete_movement_class),
        )
}

/// Query parameters for listing movement classes.
#[derive(Debug, Deserialize)]
pub struct ListMovementClassesQuery {
    /// Filter by direction: `in` or `out`.
    #[serde(rename = "type")]
    pub class_type: Option<MovementClassType>,
    /// Filter by cost center.
    pub cost_center_id: Option<Uuid>,
}

/// Request body for creating or updating a movement class.
#[derive(Debug, Deserialize, Validate)]
pub struct MovementClassRequest {
    /// Name, unique per type.
    #[validate(length(min = 1, max = 90))]
    pub name: String,
    /// Direction: `in` or `out`.
    #[serde(rename = "type")]
    pub class_type: MovementClassType,
    /// Budget, zero means uncontrolled.
    #[serde(default)]
    pub budget: Decimal,
    /// Inactive classes take no new movements.
    #[serde(default = "active_default")]
    pub active: bool,
    /// Cost center the class charges.
    pub cost_center_id: Uuid,
}

const fn active_default() -> bool {
    true
}

async fn cost_center_ref(state: &AppState, id: Uuid) -> ApiResult<CostCenterRef> {
    CostCenterRepository::new(state.conn())
        .find(id)
        .await?
        .map(|cc| cc.to_ref())
        .ok_or_else(|| ApiError::not_found("Cost center"))
}

/// GET /movement-classes - List movement classes.
async fn list_movement_classes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListMovementClassesQuery>,
) -> ApiResult<Json<Vec<MovementClass>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let repo = MovementClassRepository::new(state.conn());
    Ok(Json(repo.list(query.class_type, query.cost_center_id).await?))
}

/// GET /movement-classes/{id} - Get a single movement class.
async fn get_movement_class(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MovementClass>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    MovementClassRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Movement class"))
}

/// POST /movement-classes - Create a movement class.
async fn create_movement_class(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<MovementClassRequest>,
) -> ApiResult<(StatusCode, Json<MovementClass>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    payload.validate()?;

    let cost_center = cost_center_ref(&state, payload.cost_center_id).await?;
    let mut class = MovementClass::new(payload.name, payload.class_type, cost_center);
    class.budget = payload.budget;
    class.active = payload.active;

    let saved = MovementClassRepository::new(state.conn()).save(&class).await?;
    info!(user_id = %auth.user_id(), movement_class_id = %saved.id, "Movement class created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /movement-classes/{id} - Update a movement class.
async fn update_movement_class(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MovementClassRequest>,
) -> ApiResult<Json<MovementClass>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    payload.validate()?;

    let repo = MovementClassRepository::new(state.conn());
    let mut class = repo
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Movement class"))?;
    if class.cost_center.id != payload.cost_center_id {
        class.cost_center = cost_center_ref(&state, payload.cost_center_id).await?;
    }
    class.name = payload.name;
    class.movement_class_type = payload.class_type;
    class.budget = payload.budget;
    class.active = payload.active;

    Ok(Json(repo.save(&class).await?))
}

/// DELETE /movement-classes/{id} - Delete a class no apportionment uses.
async fn delete_movement_class(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    MovementClassRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), movement_class_id = %id, "Movement class deleted");
    Ok(StatusCode::NO_CONTENT)
}
