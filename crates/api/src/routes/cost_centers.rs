//! Cost center routes.

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
use webbudget_core::registration::{Color, CostCenter};
use webbudget_core::ui::ViewState;
use webbudget_db::CostCenterRepository;

const FUNCTIONALITY: &str = "cost-center";

/// Creates the cost center routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cost-centers", get(list_cost_centers).post(create_cost_center))
        .route(
            "/cost-centers/{id}",
            get(get_cost_center)
                .put(update_cost_center)
                .delete(delete_cost_center),
        )
}

/// Query parameters for listing cost centers.
#[derive(Debug, Deserialize)]
pub struct ListCostCentersQuery {
    /// Only list unblocked cost centers.
    #[serde(default)]
    pub unblocked: bool,
}

/// Request body for creating or updating a cost center.
#[derive(Debug, Deserialize, Validate)]
pub struct CostCenterRequest {
    /// Unique name.
    #[validate(length(min = 1, max = 90))]
    pub name: String,
    /// Display color as `#rrggbb`; random when omitted.
    pub color: Option<String>,
    /// Budget for expenses, zero disables control.
    #[serde(default)]
    pub expenses_budget: Decimal,
    /// Budget for revenues, zero disables control.
    #[serde(default)]
    pub revenues_budget: Decimal,
    /// Blocked cost centers take no new movements.
    #[serde(default)]
    pub blocked: bool,
    /// Free description.
    #[validate(length(max = 255))]
    pub description: Option<String>,
    /// Parent cost center.
    pub parent_id: Option<Uuid>,
}

impl CostCenterRequest {
    async fn apply(self, repo: &CostCenterRepository, target: &mut CostCenter) -> ApiResult<()> {
        self.validate()?;
        if let Some(color) = self.color.as_deref() {
            target.color = Color::parse(color)?;
        }
        target.parent = match self.parent_id {
            Some(parent_id) => Some(
                repo.find(parent_id)
                    .await?
                    .ok_or_else(|| ApiError::not_found("Parent cost center"))?
                    .to_ref(),
            ),
            None => None,
        };
        target.name = self.name;
        target.expenses_budget = self.expenses_budget;
        target.revenues_budget = self.revenues_budget;
        target.blocked = self.blocked;
        target.description = self.description;
        Ok(())
    }
}

/// GET /cost-centers - List cost centers with their parents.
async fn list_cost_centers(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListCostCentersQuery>,
) -> ApiResult<Json<Vec<CostCenter>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let repo = CostCenterRepository::new(state.conn());
    Ok(Json(repo.list(query.unblocked).await?))
}

/// GET /cost-centers/{id} - Get a single cost center.
async fn get_cost_center(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CostCenter>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    let repo = CostCenterRepository::new(state.conn());
    repo.find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Cost center"))
}

/// POST /cost-centers - Create a cost center.
async fn create_cost_center(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CostCenterRequest>,
) -> ApiResult<(StatusCode, Json<CostCenter>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    let repo = CostCenterRepository::new(state.conn());

    let mut cost_center = CostCenter::new(payload.name.clone());
    payload.apply(&repo, &mut cost_center).await?;
    let saved = repo.save(&cost_center).await?;

    info!(user_id = %auth.user_id(), cost_center_id = %saved.id, "Cost center created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /cost-centers/{id} - Update a cost center.
async fn update_cost_center(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CostCenterRequest>,
) -> ApiResult<Json<CostCenter>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    let repo = CostCenterRepository::new(state.conn());

    let mut cost_center = repo
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cost center"))?;
    payload.apply(&repo, &mut cost_center).await?;
    Ok(Json(repo.save(&cost_center).await?))
}

/// DELETE /cost-centers/{id} - Delete a cost center nothing refers to.
async fn delete_cost_center(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    CostCenterRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), cost_center_id = %id, "Cost center deleted");
    Ok(StatusCode::NO_CONTENT)
}
