//! Group and authorization routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
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
use webbudget_core::configuration::{Authorization, Group};
use webbudget_core::ui::ViewState;
use webbudget_db::GroupRepository;

const FUNCTIONALITY: &str = "group";

/// Creates the group routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", get(list_groups).post(create_group))
        .route(
            "/groups/{id}",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/authorizations", get(list_authorizations))
}

/// Group row in listings.
#[derive(Debug, Serialize)]
pub struct GroupSummary {
    /// Group ID.
    pub id: Uuid,
    /// Group name.
    pub name: String,
    /// Members of blocked groups get no permissions.
    pub blocked: bool,
}

/// Request body for creating or updating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct GroupRequest {
    /// Unique name.
    #[validate(length(min = 1, max = 45))]
    pub name: String,
    /// Members of blocked groups get no permissions.
    #[serde(default)]
    pub blocked: bool,
    /// Granted permissions as `functionality:permission`.
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl GroupRequest {
    fn apply(self, group: &mut Group) -> ApiResult<()> {
        self.validate()?;
        let mut granted = Vec::with_capacity(self.permissions.len());
        for permission in &self.permissions {
            granted.push(Authorization::parse(permission)?);
        }
        group.name = self.name;
        group.blocked = self.blocked;
        group.grants.clear();
        for authorization in granted {
            group.grant(authorization);
        }
        Ok(())
    }
}

/// GET /groups - List groups.
async fn list_groups(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<GroupSummary>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let groups = GroupRepository::new(state.conn()).list().await?;
    Ok(Json(
        groups
            .into_iter()
            .map(|g| GroupSummary {
                id: g.id,
                name: g.name,
                blocked: g.blocked,
            })
            .collect(),
    ))
}

/// GET /groups/{id} - Get a group with its grants.
async fn get_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Group>> {
    auth.require(FUNCTIONALITY, ViewState::Detailing)?;
    GroupRepository::new(state.conn())
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Group"))
}

/// POST /groups - Create a group.
async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<GroupRequest>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    auth.require_save(FUNCTIONALITY, ViewState::Adding)?;
    let mut group = Group::new(String::new());
    payload.apply(&mut group)?;

    GroupRepository::new(state.conn()).save(&group).await?;
    info!(user_id = %auth.user_id(), group_id = %group.id, "Group created");
    Ok((StatusCode::CREATED, Json(group)))
}

/// PUT /groups/{id} - Update a group, replacing its grants.
async fn update_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<GroupRequest>,
) -> ApiResult<Json<Group>> {
    auth.require_save(FUNCTIONALITY, ViewState::Editing)?;
    let repo = GroupRepository::new(state.conn());
    let mut group = repo
        .find(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))?;
    payload.apply(&mut group)?;
    repo.save(&group).await?;
    Ok(Json(group))
}

/// DELETE /groups/{id} - Delete a group without members.
async fn delete_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_delete(FUNCTIONALITY)?;
    GroupRepository::new(state.conn()).delete(id).await?;
    info!(user_id = %auth.user_id(), group_id = %id, "Group deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /authorizations - The registered authorization catalogue.
async fn list_authorizations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Authorization>>> {
    auth.require(FUNCTIONALITY, ViewState::Listing)?;
    let authorizations = GroupRepository::new(state.conn())
        .list_authorizations()
        .await?;
    Ok(Json(authorizations))
}
