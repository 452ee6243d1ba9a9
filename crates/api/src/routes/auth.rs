//! Authentication routes for login, token refresh and the current user.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use webbudget_core::auth::{check_password_policy, verify_password};
use webbudget_core::configuration::User;
use webbudget_db::UserRepository;
use webbudget_shared::auth::{LoginRequest, LoginResponse, RefreshRequest, TokenKind, UserInfo};

/// Creates the public auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

/// Creates the auth routes that need an access token.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/password", post(change_password))
}

/// Request body for changing the own password.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1))]
    pub current_password: String,
    /// New password.
    pub password: String,
    /// New password again.
    pub confirmation: String,
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Invalid email or password"
        })),
    )
        .into_response()
}

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        group: user.group.as_ref().map(|g| g.name.clone()),
        permissions: user.permissions(),
    }
}

/// POST /auth/login - Authenticate user and return tokens.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new(state.conn());

    let model = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            info!(email = %payload.email, "Login attempt for non-existent user");
            return invalid_credentials();
        }
        Err(e) => return ApiError::from(e).into_response(),
    };

    match verify_password(&payload.password, &model.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            info!(user_id = %model.id, "Failed login attempt - invalid password");
            return invalid_credentials();
        }
        Err(e) => {
            error!(error = %e, "Password verification error");
            return ApiError::internal().into_response();
        }
    }

    let user = match user_repo.load_domain(&model).await {
        Ok(u) => u,
        Err(e) => return ApiError::from(e).into_response(),
    };
    if let Err(e) = user.ensure_can_log_in() {
        info!(user_id = %user.id, reason = %e, "Login refused");
        return ApiError::from(e).into_response();
    }

    let tokens = match state
        .jwt_service
        .issue(user.id, &user.name, &user.permissions())
    {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to generate tokens");
            return ApiError::internal().into_response();
        }
    };

    info!(user_id = %user.id, "User logged in successfully");

    let response = LoginResponse {
        user: user_info(&user),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// POST /auth/refresh - Exchange a refresh token for a new token pair.
///
/// Permissions are reloaded so group changes apply on refresh.
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> impl IntoResponse {
    let claims = match state
        .jwt_service
        .validate_kind(&payload.refresh_token, TokenKind::Refresh)
    {
        Ok(c) => c,
        Err(e) => {
            let (error, message) = match e {
                webbudget_shared::JwtError::Expired => {
                    ("token_expired", "Refresh token has expired")
                }
                _ => ("invalid_token", "Invalid refresh token"),
            };
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response();
        }
    };

    let user_repo = UserRepository::new(state.conn());
    let model = match user_repo.find_by_id(claims.user_id()).await {
        Ok(Some(m)) => m,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "invalid_token",
                    "message": "Invalid refresh token"
                })),
            )
                .into_response();
        }
        Err(e) => return ApiError::from(e).into_response(),
    };
    let user = match user_repo.load_domain(&model).await {
        Ok(u) => u,
        Err(e) => return ApiError::from(e).into_response(),
    };
    if let Err(e) = user.ensure_can_log_in() {
        return ApiError::from(e).into_response();
    }

    match state
        .jwt_service
        .issue(user.id, &user.name, &user.permissions())
    {
        Ok(tokens) => (StatusCode::OK, Json(tokens)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to refresh tokens");
            ApiError::internal().into_response()
        }
    }
}

/// GET /auth/me - The authenticated user with current permissions.
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserInfo>> {
    let user_repo = UserRepository::new(state.conn());
    let model = user_repo
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    let user = user_repo.load_domain(&model).await?;
    Ok(Json(user_info(&user)))
}

/// POST /auth/password - Change the authenticated user's password.
async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<StatusCode> {
    payload.validate()?;
    check_password_policy(&payload.password, &payload.confirmation)?;

    let user_repo = UserRepository::new(state.conn());
    let model = user_repo
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    if !verify_password(&payload.current_password, &model.password_hash)? {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Current password is wrong",
        ));
    }

    user_repo.change_password(model.id, &payload.password).await?;
    Ok(StatusCode::NO_CONTENT)
}
