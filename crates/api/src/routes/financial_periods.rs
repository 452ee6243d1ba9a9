//! Financial period routes: periods, closings and budget reports.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use webbudget_core::budget::BudgetConsumptionReport;
use webbudget_core::financial::{Closing, FinancialPeriod, Launch};
use webbudget_core::registration::MovementClassType;
use webbudget_core::ui::ViewState;
use webbudget_db::{FinancialPeriodRepository, FixedMovementRepository};

const FUNCTIONALITY: &str = "financial-period";
const CLOSING: &str = "closing";

/// Creates the financial period routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/financial-periods",
            get(list_periods).post(create_period),
        )
        .route(
            "/financial-periods/{id}",
            get(get_period).delete(delete_period),
        )
        .route(
            "/financial-periods/{id}/closing",
            get(get_closing).post(close_period),
        )
        .route("/financial-periods/{id}/budget", get(budget_report))
}

/// Query parameters for listing periods.
#[derive(Debug, Deserialize)]
pub struct ListPeriodsQuery {
    /// Only list open periods.
    #[serde(default)]
    pub open: bool,
}

/// Request body for creating a period.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePeriodRequest {
    /// Unique identification, e.g. `01/2026`.
    #[validate(length(min = 1, max = 90))]
    pub identification: String,
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
}

/// Response for a created period with the fixed movements launched into it.
#[derive(Debug, Serialize)]
pub struct CreatePeriodResponse {
    /// The new period.
    #[serde(flatten)]
    pub period: FinancialPeriod,
    /// Launches made for auto-launch fixed movements.
    pub launches: Vec<Launch>,
}

/// Request body for closing a period.
#[derive(Debug, Deserialize)]
pub struct ClosePeriodRequest {
    /// Closing date, today when omitted.
    pub closing_date: Option<NaiveDate>,
}

/// Query parameters for the budget report.
#[derive(Debug, Deserialize)]
pub struct BudgetQuery {
    /// `in` for revenues, `out` for expenses (default).
    #[serde(rename = "type", default = "expenses")]
    pub class_type: MovementClassType,
}

const fn expenses() -> MovementClassType {
    MovementClassType::Out
}

/// GET /financial-periods - List periods, newest first.
async fn list_periods(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListPeriodsQuery>,
) -> ApiResult<Json<Vec<FinancialPeriod>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let repo = FinancialPeriodRepository::new(state.conn());
    Ok(Json(repo.list(query.open).await?))
}

/// GET /financial-periods/{id} - Get a single period.
async fn get_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FinancialPeriod>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    FinancialPeriodRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Financial period"))
}

/// POST /financial-periods - Create a period and launch auto-launch fixed movements.
///
/// A failing automatic launch is logged and skipped; the period stays created.
async fn create_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePeriodRequest>,
) -> ApiResult<(StatusCode, Json<CreatePeriodResponse>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    payload.validate()?;

    let period = FinancialPeriod {
        id: Uuid::now_v7(),
        identification: payload.identification,
        start: payload.start,
        end: payload.end,
        closed: false,
    };
    let period = FinancialPeriodRepository::new(state.conn())
        .create(&period)
        .await?;

    let launches = match FixedMovementRepository::new(state.conn())
        .launch_automatic(period.id)
        .await
    {
        Ok(launches) => launches,
        Err(e) => {
            warn!(period_id = %period.id, error = %e, "Automatic launches failed");
            Vec::new()
        }
    };

    info!(
        user_id = %auth.user_id(),
        period_id = %period.id,
        launches = launches.len(),
        "Financial period created"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreatePeriodResponse { period, launches }),
    ))
}

/// DELETE /financial-periods/{id} - Delete an open period without movements.
async fn delete_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    FinancialPeriodRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), period_id = %id, "Financial period deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /financial-periods/{id}/closing - Close the period.
async fn close_period(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClosePeriodRequest>,
) -> ApiResult<(StatusCode, Json<Closing>)> {
    auth.require_save(CLOSING, ViewState::Adding)?;
    let closing_date = payload
        .closing_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let closing = FinancialPeriodRepository::new(state.conn())
        .close(id, closing_date)
        .await?;
    info!(user_id = %auth.user_id(), period_id = %id, balance = %closing.balance, "Period closed");
    Ok((StatusCode::CREATED, Json(closing)))
}

/// GET /financial-periods/{id}/closing - The closing of a closed period.
async fn get_closing(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Closing>> {
    auth.require(CLOSING, ViewState::Detailing)?;
    FinancialPeriodRepository::new(state.conn())
        .find_closing(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Closing"))
}

/// GET /financial-periods/{id}/budget - Budget consumption per class and cost center.
async fn budget_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<BudgetQuery>,
) -> ApiResult<Json<BudgetConsumptionReport>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    let report = FinancialPeriodRepository::new(state.conn())
        .budget_consumption(id, query.class_type)
        .await?;
    Ok(Json(report))
}
