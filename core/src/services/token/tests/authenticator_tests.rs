//! Tests for bearer authentication with token type policies

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::{access_claims, in_one_hour, inspector, signer, verifier};
use crate::domain::entities::{Claim, TokenType, TokenTypePolicy};
use crate::errors::{AuthError, ClaimError, ErrorClass, VerificationError};
use crate::services::token::{bearer_authorization, Authenticator};

fn authenticator() -> Authenticator {
    Authenticator::new(Arc::new(verifier()), inspector())
}

fn refresh_token() -> String {
    signer()
        .sign(&[
            Claim::new("email", "a@b.com"),
            Claim::new("type", TokenType::Refresh),
            Claim::new("exp", in_one_hour()),
            Claim::new("user_id", "42"),
        ])
        .unwrap()
}

#[test]
fn test_any_policy_accepts_every_type() {
    let claims = authenticator().authenticate(&refresh_token()).unwrap();
    assert_eq!(claims.token_type, TokenType::Refresh);
    assert_eq!(claims.user_id, "42");
}

#[test]
fn test_restricted_policy_rejects_other_types() {
    let access_only = authenticator().with_policy(TokenTypePolicy::Only(TokenType::Access));

    let err = access_only.authenticate(&refresh_token()).unwrap_err();
    assert!(matches!(
        err,
        AuthError::Claim(ClaimError::TokenTypeNotAllowed {
            found: TokenType::Refresh
        })
    ));
    assert_eq!(err.class(), ErrorClass::Unauthenticated);

    let token = signer().sign(&access_claims(in_one_hour())).unwrap();
    assert!(access_only.authenticate(&token).is_ok());
}

#[test]
fn test_verification_failures_pass_through() {
    let token = signer()
        .sign(&access_claims(Utc::now() - Duration::minutes(1)))
        .unwrap();
    assert!(matches!(
        authenticator().authenticate(&token),
        Err(AuthError::Verification(VerificationError::Expired))
    ));
}

#[test]
fn test_verified_token_without_claims_is_rejected() {
    let token = signer().sign(&[Claim::new("exp", in_one_hour())]).unwrap();
    assert!(matches!(
        authenticator().authenticate(&token),
        Err(AuthError::Claim(ClaimError::MissingClaim { .. }))
    ));
}

#[test]
fn test_authenticate_header() {
    let token = signer().sign(&access_claims(in_one_hour())).unwrap();
    let header = bearer_authorization(&token);

    let claims = authenticator().authenticate_header(Some(&header)).unwrap();
    assert_eq!(claims.email, "a@b.com");

    assert!(matches!(
        authenticator().authenticate_header(None),
        Err(AuthError::MissingCredentials)
    ));
    assert!(matches!(
        authenticator().authenticate_header(Some("Basic dXNlcjpwYXNz")),
        Err(AuthError::MissingCredentials)
    ));
}
