//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod cards;
pub mod cost_centers;
pub mod financial_periods;
pub mod fixed_movements;
pub mod groups;
pub mod health;
pub mod movement_classes;
pub mod movements;
pub mod refuelings;
pub mod users;
pub mod vehicles;
pub mod wallets;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(users::routes())
        .merge(groups::routes())
        .merge(cost_centers::routes())
        .merge(movement_classes::routes())
        .merge(wallets::routes())
        .merge(cards::routes())
        .merge(vehicles::routes())
        .merge(financial_periods::routes())
        .merge(movements::routes())
        .merge(fixed_movements::routes())
        .merge(refuelings::routes())
        .layer(middleware::from_fn_with_state(state, auth_middleware));

    // Combine public and protected routes
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
