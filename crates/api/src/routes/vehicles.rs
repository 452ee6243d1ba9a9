//! Vehicle routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use webbudget_core::registration::Vehicle;
use webbudget_core::ui::ViewState;
use webbudget_db::{CostCenterRepository, VehicleRepository};

const FUNCTIONALITY: &str = "vehicle";

/// Creates the vehicle routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/vehicles/{id}",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

/// Query parameters for listing vehicles.
#[derive(Debug, Deserialize)]
pub struct ListVehiclesQuery {
    /// Only list active vehicles.
    #[serde(default)]
    pub active: bool,
}

/// Request body for creating or updating a vehicle.
#[derive(Debug, Deserialize, Validate)]
pub struct VehicleRequest {
    /// Short identification.
    #[validate(length(min = 1, max = 90))]
    pub identification: String,
    /// Manufacturer.
    #[validate(length(max = 90))]
    pub brand: Option<String>,
    /// Model name.
    #[validate(length(max = 90))]
    pub model: Option<String>,
    /// License plate.
    #[validate(length(max = 10))]
    pub license_plate: Option<String>,
    /// Model year.
    pub model_year: Option<i32>,
    /// Tank capacity in liters.
    #[validate(range(min = 1))]
    pub fuel_capacity: Option<i32>,
    /// Current odometer reading.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub odometer: i64,
    /// Cost center refuelings are charged to.
    pub cost_center_id: Uuid,
    /// Inactive vehicles take no refuelings.
    #[serde(default = "active_default")]
    pub active: bool,
}

const fn active_default() -> bool {
    true
}

impl VehicleRequest {
    async fn into_vehicle(self, state: &AppState, id: Uuid) -> ApiResult<Vehicle> {
        self.validate()?;
        let cost_center = CostCenterRepository::new(state.conn())
            .find(self.cost_center_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Cost center"))?;
        Ok(Vehicle {
            id,
            identification: self.identification,
            brand: self.brand,
            model: self.model,
            license_plate: self.license_plate,
            model_year: self.model_year,
            fuel_capacity: self.fuel_capacity,
            odometer: self.odometer,
            cost_center: cost_center.to_ref(),
            active: self.active,
        })
    }
}

/// GET /vehicles - List vehicles.
async fn list_vehicles(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListVehiclesQuery>,
) -> ApiResult<Json<Vec<Vehicle>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    Ok(Json(VehicleRepository::new(state.conn()).list(query.active).await?))
}

/// GET /vehicles/{id} - Get a single vehicle.
async fn get_vehicle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vehicle>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    VehicleRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Vehicle"))
}

/// POST /vehicles - Create a vehicle.
async fn create_vehicle(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<VehicleRequest>,
) -> ApiResult<(StatusCode, Json<Vehicle>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    let vehicle = payload.into_vehicle(&state, Uuid::now_v7()).await?;
    let saved = VehicleRepository::new(state.conn()).save(&vehicle).await?;
    info!(user_id = %auth.user_id(), vehicle_id = %saved.id, "Vehicle created");
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /vehicles/{id} - Update a vehicle.
async fn update_vehicle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<VehicleRequest>,
) -> ApiResult<Json<Vehicle>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    let repo = VehicleRepository::new(state.conn());
    if repo.find(id).await?.is_none() {
        return Err(ApiError::not_found("Vehicle"));
    }
    let vehicle = payload.into_vehicle(&state, id).await?;
    Ok(Json(repo.save(&vehicle).await?))
}

/// DELETE /vehicles/{id} - Delete a vehicle without refuelings.
async fn delete_vehicle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    VehicleRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), vehicle_id = %id, "Vehicle deleted");
    Ok(StatusCode::NO_CONTENT)
}
