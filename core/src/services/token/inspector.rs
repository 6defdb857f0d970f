//! Typed access to the claims of decoded tokens

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde_json::Value;
use sigil_shared::ClaimKeys;

use super::verifier::check_shape;
use crate::domain::entities::token::{require_claim, timestamp_from_value};
use crate::domain::entities::{
    ClaimMap, ClaimSource, TokenClaims, TokenType, UnverifiedClaims, UnverifiedToken,
    VerifiedClaims, VerifiedToken,
};
use crate::errors::{AuthResult, ClaimError, VerificationError};

/// Reads the well-known claims using a fixed schema
#[derive(Debug, Clone, Default)]
pub struct TokenInspector {
    claim_keys: ClaimKeys,
}

impl TokenInspector {
    pub fn new(claim_keys: ClaimKeys) -> Self {
        Self { claim_keys }
    }

    pub fn claim_keys(&self) -> &ClaimKeys {
        &self.claim_keys
    }

    /// Raw value of any claim
    pub fn claim<'a, T: ClaimSource>(
        &self,
        token: &'a T,
        key: &str,
    ) -> Result<&'a Value, ClaimError> {
        require_claim(token.claim_map(), key)
    }

    pub fn email<T: ClaimSource>(&self, token: &T) -> Result<String, ClaimError> {
        text_claim(token.claim_map(), &self.claim_keys.email)
    }

    pub fn user_id<T: ClaimSource>(&self, token: &T) -> Result<String, ClaimError> {
        text_claim(token.claim_map(), &self.claim_keys.user_id)
    }

    pub fn expiry<T: ClaimSource>(&self, token: &T) -> Result<DateTime<Utc>, ClaimError> {
        let key = &self.claim_keys.expiry;
        let value = require_claim(token.claim_map(), key)?;
        timestamp_from_value(value).ok_or_else(|| ClaimError::InvalidClaimType {
            key: key.clone(),
            expected: "timestamp",
        })
    }

    pub fn token_type<T: ClaimSource>(&self, token: &T) -> Result<TokenType, ClaimError> {
        let key = &self.claim_keys.token_type;
        text_claim(token.claim_map(), key)?
            .parse()
            .map_err(|_| ClaimError::InvalidClaimType {
                key: key.clone(),
                expected: "token type",
            })
    }

    /// Email, token type, expiry and user id, failing on the first bad one
    pub fn claims<T: ClaimSource>(&self, token: &T) -> Result<TokenClaims, ClaimError> {
        Ok(TokenClaims {
            email: self.email(token)?,
            token_type: self.token_type(token)?,
            expiry: self.expiry(token)?,
            user_id: self.user_id(token)?,
        })
    }

    pub fn verified_claims(&self, token: &VerifiedToken) -> Result<VerifiedClaims, ClaimError> {
        self.claims(token).map(VerifiedClaims::new)
    }

    /// Decode a token without checking its signature or expiry
    pub fn parse_unverified(&self, token: &str) -> Result<UnverifiedToken, VerificationError> {
        check_shape(token)?;

        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<ClaimMap>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|_| VerificationError::MalformedToken)?;
        Ok(UnverifiedToken::new(data.header, data.claims))
    }

    /// Read the typed claims of a token whose signature is not checked.
    ///
    /// The result must not be used for authorization decisions.
    pub fn claims_from_string(&self, token: &str) -> AuthResult<UnverifiedClaims> {
        let parsed = self.parse_unverified(token)?;
        let claims = self.claims(&parsed)?;
        Ok(UnverifiedClaims::new(claims))
    }
}

fn text_claim(claims: &ClaimMap, key: &str) -> Result<String, ClaimError> {
    match require_claim(claims, key)? {
        Value::String(text) => Ok(text.clone()),
        _ => Err(ClaimError::InvalidClaimType {
            key: key.to_string(),
            expected: "string",
        }),
    }
}
