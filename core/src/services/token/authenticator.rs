//! Verification plus claim extraction for request authentication

use std::sync::Arc;

use super::bearer::extract_bearer_token;
use super::inspector::TokenInspector;
use super::traits::TokenVerifierTrait;
use crate::domain::entities::{TokenTypePolicy, VerifiedClaims};
use crate::errors::{AuthError, AuthResult};

/// Turns a presented token into verified claims
#[derive(Clone)]
pub struct Authenticator {
    verifier: Arc<dyn TokenVerifierTrait>,
    inspector: TokenInspector,
    policy: TokenTypePolicy,
}

impl Authenticator {
    pub fn new(verifier: Arc<dyn TokenVerifierTrait>, inspector: TokenInspector) -> Self {
        Self {
            verifier,
            inspector,
            policy: TokenTypePolicy::Any,
        }
    }

    /// Only accept tokens allowed by `policy`
    pub fn with_policy(mut self, policy: TokenTypePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TokenTypePolicy {
        self.policy
    }

    /// Verify `token` and read its claims, enforcing the token type policy
    pub fn authenticate(&self, token: &str) -> AuthResult<VerifiedClaims> {
        let verified = self.verifier.verify(token)?;
        let claims = self.inspector.verified_claims(&verified)?;
        self.policy.check(claims.token_type)?;

        tracing::debug!(
            user_id = %claims.user_id,
            token_type = %claims.token_type,
            event = "token_authenticated",
            "Token authenticated"
        );
        Ok(claims)
    }

    /// Same as [`Self::authenticate`], starting from an `Authorization` header value
    pub fn authenticate_header(&self, header_value: Option<&str>) -> AuthResult<VerifiedClaims> {
        let token = header_value
            .and_then(extract_bearer_token)
            .ok_or(AuthError::MissingCredentials)?;
        self.authenticate(token)
    }
}
