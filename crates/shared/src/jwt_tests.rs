//! Unit tests for JWT functionality.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{Claims, TokenKind};
use crate::jwt::{JwtConfig, JwtError, JwtService};

fn create_test_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expires_minutes: 15,
        refresh_token_expires_days: 7,
    })
}

#[test]
fn test_claims_new_sets_correct_fields() {
    let user_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(1);

    let claims = Claims::new(
        user_id,
        "Ana",
        vec!["cost-center:access".to_string()],
        TokenKind::Access,
        expires_at,
    );

    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.name, "Ana");
    assert!(claims.iat <= Utc::now().timestamp());
    assert_eq!(claims.exp, expires_at.timestamp());
    assert!(claims.has_permission("cost-center:access"));
    assert!(!claims.has_permission("cost-center:delete"));
}

#[test]
fn test_issue_and_validate_access_token() {
    let service = create_test_service();
    let user_id = Uuid::new_v4();
    let perms = vec!["wallet:add".to_string(), "wallet:access".to_string()];

    let pair = service.issue(user_id, "Ana", &perms).unwrap();
    assert_eq!(pair.expires_in, 900);

    let claims = service
        .validate_kind(&pair.access_token, TokenKind::Access)
        .unwrap();
    assert_eq!(claims.user_id(), user_id);
    assert_eq!(claims.perms, perms);
}

#[test]
fn test_refresh_token_has_no_permissions() {
    let service = create_test_service();
    let pair = service
        .issue(Uuid::new_v4(), "Ana", &["wallet:add".to_string()])
        .unwrap();

    let claims = service
        .validate_kind(&pair.refresh_token, TokenKind::Refresh)
        .unwrap();
    assert!(claims.perms.is_empty());
}

#[test]
fn test_refresh_token_rejected_as_access() {
    let service = create_test_service();
    let pair = service.issue(Uuid::new_v4(), "Ana", &[]).unwrap();

    let result = service.validate_kind(&pair.refresh_token, TokenKind::Access);
    assert!(matches!(result, Err(JwtError::WrongKind)));
}

#[test]
fn test_invalid_token() {
    let service = create_test_service();
    let result = service.validate_token("invalid.token.here");
    assert!(matches!(result, Err(JwtError::DecodingError(_))));
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let other = JwtService::new(JwtConfig {
        secret: "another-secret".to_string(),
        ..JwtConfig::default()
    });
    let pair = other.issue(Uuid::new_v4(), "Ana", &[]).unwrap();

    assert!(create_test_service().validate_token(&pair.access_token).is_err());
}

#[test]
fn test_expired_token() {
    let service = JwtService::new(JwtConfig {
        secret: "test-secret-key-for-testing".to_string(),
        access_token_expires_minutes: -10,
        refresh_token_expires_days: 7,
    });
    let pair = service.issue(Uuid::new_v4(), "Ana", &[]).unwrap();

    let result = create_test_service().validate_kind(&pair.access_token, TokenKind::Access);
    assert!(matches!(result, Err(JwtError::Expired)));
}
