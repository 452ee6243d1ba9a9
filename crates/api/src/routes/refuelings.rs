//! Refueling routes for the vehicle journal.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
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
use webbudget_core::journal::{Fuel, FuelType, Refueling};
use webbudget_core::ui::ViewState;
use webbudget_db::{MovementClassRepository, RefuelingRepository, VehicleRepository};

const FUNCTIONALITY: &str = "refueling";

/// Creates the refueling routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/refuelings", get(list_refuelings).post(create_refueling))
        .route(
            "/refuelings/{id}",
            get(get_refueling).delete(delete_refueling),
        )
}

/// Query parameters for listing refuelings.
#[derive(Debug, Deserialize)]
pub struct ListRefuelingsQuery {
    /// Filter by vehicle.
    pub vehicle_id: Option<Uuid>,
}

/// One fuel bought in a refueling.
#[derive(Debug, Deserialize, Serialize)]
pub struct FuelRequest {
    /// Fuel type.
    pub fuel_type: FuelType,
    /// Liters bought.
    pub liters: Decimal,
    /// Price per liter.
    pub value_per_liter: Decimal,
}

/// Request body for registering a refueling.
#[derive(Debug, Deserialize, Validate)]
pub struct RefuelingRequest {
    /// Refueled vehicle.
    pub vehicle_id: Uuid,
    /// Expense class the cost is booked under.
    pub movement_class_id: Uuid,
    /// Period the generated movement belongs to.
    pub financial_period_id: Uuid,
    /// Refueling date, also the movement due date.
    pub event_date: NaiveDate,
    /// Odometer reading at the pump.
    #[validate(range(min = 0))]
    pub odometer: i64,
    /// Whether the tank was filled.
    #[serde(default = "full_tank_default")]
    pub full_tank: bool,
    /// Gas station.
    #[validate(length(max = 90))]
    pub place: Option<String>,
    /// Fuels bought.
    #[validate(length(min = 1))]
    pub fuels: Vec<FuelRequest>,
}

const fn full_tank_default() -> bool {
    true
}

/// GET /refuelings - List refuelings, newest odometer first.
async fn list_refuelings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListRefuelingsQuery>,
) -> ApiResult<Json<Vec<Refueling>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let repo = RefuelingRepository::new(state.conn());
    Ok(Json(repo.list(query.vehicle_id).await?))
}

/// GET /refuelings/{id} - Get a refueling with its fuels.
async fn get_refueling(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Refueling>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    RefuelingRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Refueling"))
}

/// POST /refuelings - Register a refueling and the movement paying for it.
async fn create_refueling(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RefuelingRequest>,
) -> ApiResult<(StatusCode, Json<Refueling>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    payload.validate()?;

    let vehicle = VehicleRepository::new(state.conn())
        .find_ref(payload.vehicle_id)
        .await?;
    let class = MovementClassRepository::new(state.conn())
        .find_refs(&[payload.movement_class_id])
        .await?
        .remove(&payload.movement_class_id)
        .ok_or_else(|| ApiError::not_found("Movement class"))?;

    let mut refueling = Refueling::new(
        vehicle,
        class,
        payload.financial_period_id,
        payload.event_date,
    );
    refueling.odometer = payload.odometer;
    refueling.full_tank = payload.full_tank;
    refueling.place = payload.place;
    for fuel in payload.fuels {
        refueling.add_fuel(Fuel::new(fuel.fuel_type, fuel.liters, fuel.value_per_liter)?);
    }

    let created = RefuelingRepository::new(state.conn())
        .create(refueling)
        .await?;
    info!(user_id = %auth.user_id(), code = %created.code, "Refueling registered");
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /refuelings/{id} - Delete a refueling whose movement is still open.
async fn delete_refueling(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    RefuelingRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), refueling_id = %id, "Refueling deleted");
    Ok(StatusCode::NO_CONTENT)
}
