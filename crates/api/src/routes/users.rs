//! User management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    middleware::AuthUser,
};
use webbudget_core::auth::check_password_policy;
use webbudget_core::configuration::User;
use webbudget_core::ui::ViewState;
use webbudget_db::{
    CreateUserInput, UpdateUserInput, UserRepository, entities::users,
};
use webbudget_shared::AppError;

const FUNCTIONALITY: &str = "user";

/// Creates the user routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/{id}/password", put(reset_password))
}

/// User row in listings.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Blocked users cannot log in.
    pub blocked: bool,
    /// Group granting the permissions.
    pub group_id: Option<Uuid>,
}

impl From<users::Model> for UserSummary {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            blocked: model.blocked,
            group_id: model.group_id,
        }
    }
}

/// Request body for creating a user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Display name.
    #[validate(length(min = 1, max = 90))]
    pub name: String,
    /// Login email.
    #[validate(email)]
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Password again.
    pub confirmation: String,
    /// Group granting the permissions.
    pub group_id: Option<Uuid>,
}

/// Request body for updating a user.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// Display name.
    #[validate(length(min = 1, max = 90))]
    pub name: String,
    /// Blocked users cannot log in.
    #[serde(default)]
    pub blocked: bool,
    /// Group granting the permissions.
    pub group_id: Option<Uuid>,
}

/// Request body for an administrative password reset.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    /// New password.
    pub password: String,
    /// New password again.
    pub confirmation: String,
}

/// GET /users - List users.
async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<UserSummary>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let users = UserRepository::new(state.conn()).list().await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

/// GET /users/{id} - Get a user with group and grants.
async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    let repo = UserRepository::new(state.conn());
    let model = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(repo.load_domain(&model).await?))
}

/// POST /users - Create a user.
async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserSummary>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    payload.validate()?;
    check_password_policy(&payload.password, &payload.confirmation)?;

    let model = UserRepository::new(state.conn())
        .create(CreateUserInput {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            group_id: payload.group_id,
        })
        .await?;
    info!(user_id = %auth.user_id(), created_user_id = %model.id, "User registered");
    Ok((StatusCode::CREATED, Json(model.into())))
}

/// PUT /users/{id} - Update name, blocked flag and group.
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserSummary>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    payload.validate()?;
    if id == auth.user_id() && payload.blocked {
        return Err(AppError::BusinessRule("Users cannot block themselves".into()).into());
    }

    let model = UserRepository::new(state.conn())
        .update(
            id,
            UpdateUserInput {
                name: payload.name,
                blocked: payload.blocked,
                group_id: payload.group_id,
            },
        )
        .await?;
    Ok(Json(model.into()))
}

/// DELETE /users/{id} - Delete another user.
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    if id == auth.user_id() {
        return Err(AppError::BusinessRule("Users cannot delete themselves".into()).into());
    }
    UserRepository::new(state.conn()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /users/{id}/password - Set another user's password.
async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<StatusCode> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    check_password_policy(&payload.password, &payload.confirmation)?;
    UserRepository::new(state.conn())
        .change_password(id, &payload.password)
        .await?;
    info!(user_id = %auth.user_id(), target_user_id = %id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}
