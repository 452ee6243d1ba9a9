//! Authentication middleware for protected routes.
//!
//! Handlers declare the functionality they serve and the view state they
//! work in; the permission the user needs follows from the state.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;
use webbudget_core::ui::ViewState;
use webbudget_shared::{Claims, JwtError, auth::TokenKind};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT access tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates it as an access token
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_token",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    match state.jwt_service.validate_kind(token, TokenKind::Access) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let (error, message) = match e {
                JwtError::Expired => ("token_expired", "Token has expired"),
                _ => ("invalid_token", "Invalid or malformed token"),
            };

            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response()
        }
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }

    /// Returns the inner claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.0
    }

    /// Requires the permission `state` needs over `functionality`.
    ///
    /// # Errors
    ///
    /// Returns 403 `forbidden` when the token lacks it.
    pub fn require(&self, functionality: &str, state: ViewState) -> Result<(), ApiError> {
        let authorization = state.required_authorization(functionality);
        let permission = authorization.full_permission();
        if self.0.has_permission(&permission) {
            return Ok(());
        }
        warn!(user_id = %self.user_id(), permission = %permission, "Permission denied");
        Err(ApiError::new(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!("Missing permission '{permission}'"),
        ))
    }

    /// Requires the permission of `state` and that saving is legal in it.
    ///
    /// # Errors
    ///
    /// Returns 403 without the permission, or the state's save error.
    pub fn require_save(&self, functionality: &str, state: ViewState) -> Result<(), ApiError> {
        self.require(functionality, state)?;
        state.save()?;
        Ok(())
    }

    /// Requires the delete permission over `functionality`.
    ///
    /// # Errors
    ///
    /// Returns 403 without the permission.
    pub fn require_delete(&self, functionality: &str) -> Result<(), ApiError> {
        let state = ViewState::Deleting.enter_state(ViewState::Listing)?;
        self.require(functionality, state)?;
        state.delete()?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user(perms: &[&str]) -> AuthUser {
        AuthUser(Claims::new(
            uuid::Uuid::now_v7(),
            "Tester",
            perms.iter().map(ToString::to_string).collect(),
            TokenKind::Access,
            chrono::Utc::now() + chrono::Duration::minutes(5),
        ))
    }

    #[rstest]
    #[case(ViewState::Listing, "wallet:access")]
    #[case(ViewState::Adding, "wallet:add")]
    #[case(ViewState::Editing, "wallet:update")]
    #[case(ViewState::Deleting, "wallet:delete")]
    #[case(ViewState::Detailing, "wallet:detail")]
    fn test_state_requires_its_permission(#[case] state: ViewState, #[case] permission: &str) {
        assert!(user(&[permission]).require("wallet", state).is_ok());
        let err = user(&["card:access"]).require("wallet", state).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_save_requires_a_saving_state() {
        let auth = user(&["wallet:detail"]);
        let err = auth.require_save("wallet", ViewState::Detailing).unwrap_err();
        assert_eq!(err.code(), "operation_not_supported");
    }

    #[test]
    fn test_delete_requires_delete_permission() {
        assert!(user(&["wallet:delete"]).require_delete("wallet").is_ok());
        assert!(user(&["wallet:update"]).require_delete("wallet").is_err());
    }

    #[test]
    fn test_bearer_prefix() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }
}
