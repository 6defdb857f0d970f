//! Tests for typed claim access

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use sigil_shared::ClaimKeys;

use super::{
    access_claims, in_one_hour, inspector, signer, tamper_signature, verifier, KEY_MANAGER,
};
use crate::domain::entities::{Claim, TokenClaims, TokenType};
use crate::errors::{AuthError, ClaimError, VerificationError};
use crate::services::token::{TokenInspector, TokenSigner, TokenVerifier};

#[test]
fn test_reads_typed_claims_from_verified_token() {
    let expiry = Utc.timestamp_opt(Utc::now().timestamp() + 3600, 0).unwrap();
    let token = signer().sign(&access_claims(expiry)).unwrap();
    let verified = verifier().verify(&token).unwrap();
    let inspector = inspector();

    assert_eq!(inspector.email(&verified).unwrap(), "a@b.com");
    assert_eq!(inspector.token_type(&verified).unwrap(), TokenType::Access);
    assert_eq!(inspector.expiry(&verified).unwrap(), expiry);
    assert_eq!(inspector.user_id(&verified).unwrap(), "42");

    let claims = inspector.verified_claims(&verified).unwrap();
    assert_eq!(claims.email, "a@b.com");
    assert_eq!(claims.expiry, expiry);
}

#[test]
fn test_access_token_for_test_user_round_trips() {
    let expiry = Utc::now() + Duration::hours(2);
    let token = signer()
        .sign(&[
            Claim::new("email", "test@email.com"),
            Claim::new("exp", expiry),
            Claim::new("type", TokenType::Access),
            Claim::new("user_id", "abc123"),
        ])
        .unwrap();
    let verified = verifier().verify(&token).unwrap();
    let claims = inspector().verified_claims(&verified).unwrap();

    assert_eq!(claims.email, "test@email.com");
    assert_eq!(claims.token_type, TokenType::Access);
    assert_eq!(claims.user_id, "abc123");
    assert!((claims.expiry - expiry).num_milliseconds().abs() < 1000);
}

#[test]
fn test_expiry_of_unverified_token_must_be_a_timestamp() {
    let token = signer()
        .sign(&[
            Claim::new("exp", "tomorrow"),
            Claim::new("user_id", "42"),
        ])
        .unwrap();
    let parsed = inspector().parse_unverified(&token).unwrap();

    assert_eq!(
        inspector().expiry(&parsed).unwrap_err(),
        ClaimError::InvalidClaimType {
            key: "exp".into(),
            expected: "timestamp"
        }
    );
    assert_eq!(inspector().user_id(&parsed).unwrap(), "42");
}

#[test]
fn test_raw_claim_access() {
    let token = signer().sign(&access_claims(in_one_hour())).unwrap();
    let verified = verifier().verify(&token).unwrap();

    assert_eq!(inspector().claim(&verified, "type").unwrap(), &json!("AccessTokenType"));
    assert!(inspector().claim(&verified, "nonce").unwrap().is_string());
    assert_eq!(
        inspector().claim(&verified, "role").unwrap_err(),
        ClaimError::MissingClaim { key: "role".into() }
    );
}

#[test]
fn test_missing_claim_is_reported_by_name() {
    let token = signer()
        .sign(&[
            Claim::new("exp", in_one_hour()),
            Claim::new("type", TokenType::Refresh),
        ])
        .unwrap();
    let verified = verifier().verify(&token).unwrap();

    assert_eq!(
        inspector().email(&verified).unwrap_err(),
        ClaimError::MissingClaim {
            key: "email".into()
        }
    );
    assert_eq!(
        inspector().verified_claims(&verified).unwrap_err(),
        ClaimError::MissingClaim {
            key: "email".into()
        }
    );
}

#[test]
fn test_wrong_claim_shapes_are_reported() {
    let token = signer()
        .sign(&[
            Claim::new("exp", in_one_hour()),
            Claim::new("email", Utc::now()),
            Claim::new("type", "AdminTokenType"),
        ])
        .unwrap();
    let verified = verifier().verify(&token).unwrap();

    assert_eq!(
        inspector().email(&verified).unwrap_err(),
        ClaimError::InvalidClaimType {
            key: "email".into(),
            expected: "string"
        }
    );
    assert_eq!(
        inspector().token_type(&verified).unwrap_err(),
        ClaimError::InvalidClaimType {
            key: "type".into(),
            expected: "token type"
        }
    );
}

#[test]
fn test_claims_from_string_skips_signature_check() {
    let token = signer().sign(&access_claims(in_one_hour())).unwrap();
    let forged = tamper_signature(&token);
    assert_eq!(
        verifier().verify(&forged).unwrap_err(),
        VerificationError::SignatureInvalid
    );

    let claims = inspector().claims_from_string(&forged).unwrap();
    assert_eq!(claims.untrusted().user_id, "42");
    assert_eq!(claims.untrusted().email, "a@b.com");
}

#[test]
fn test_claims_from_string_ignores_expiry() {
    let token = signer()
        .sign(&access_claims(Utc::now() - Duration::days(1)))
        .unwrap();
    let claims = inspector().claims_from_string(&token).unwrap().into_untrusted();
    assert_eq!(claims.token_type, TokenType::Access);
    assert!(claims.is_expired_at(Utc::now()));
}

#[test]
fn test_claims_from_string_rejects_garbage() {
    assert!(matches!(
        inspector().claims_from_string("not-a-token"),
        Err(AuthError::Verification(VerificationError::MalformedToken))
    ));
}

#[test]
fn test_custom_schema() {
    let keys = ClaimKeys {
        user_id: "sub".into(),
        email: "mail".into(),
        ..ClaimKeys::default()
    };
    let expiry = Utc.timestamp_opt(Utc::now().timestamp() + 600, 0).unwrap();
    let claims = TokenClaims::new(
        "c@d.com",
        TokenType::ResetPassword,
        expiry,
        "7",
    );

    let signer = TokenSigner::new(KEY_MANAGER.clone(), keys.clone());
    let verifier = TokenVerifier::new(KEY_MANAGER.clone(), keys.clone());
    let token = signer.sign(&claims.to_claims(&keys)).unwrap();
    let verified = verifier.verify(&token).unwrap();

    let read = TokenInspector::new(keys).verified_claims(&verified).unwrap();
    assert_eq!(read.into_inner(), claims);
}
