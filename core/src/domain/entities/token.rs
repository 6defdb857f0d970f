//! Decoded tokens and the claim sets read from them
//!
//! A [`VerifiedToken`] can only be produced by the verifier, and a
//! [`VerifiedClaims`] only from a verified token. Payloads decoded without a
//! signature check are kept in the separate `Unverified*` types so the two can
//! never be confused at a call site.

use std::ops::Deref;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::Header;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sigil_shared::ClaimKeys;

use super::claim::Claim;
use super::token_type::TokenType;
use crate::errors::ClaimError;

/// Raw claim mapping of a decoded payload
pub type ClaimMap = Map<String, Value>;

/// Anything that exposes a decoded claim mapping
pub trait ClaimSource {
    fn claim_map(&self) -> &ClaimMap;
}

/// Token whose signature, algorithm and expiry have been checked
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    header: Header,
    claims: ClaimMap,
}

impl VerifiedToken {
    pub(crate) fn new(header: Header, claims: ClaimMap) -> Self {
        Self { header, claims }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn claims(&self) -> &ClaimMap {
        &self.claims
    }
}

impl ClaimSource for VerifiedToken {
    fn claim_map(&self) -> &ClaimMap {
        &self.claims
    }
}

/// Token decoded without any signature or expiry check
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    header: Header,
    claims: ClaimMap,
}

impl UnverifiedToken {
    pub(crate) fn new(header: Header, claims: ClaimMap) -> Self {
        Self { header, claims }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn claims(&self) -> &ClaimMap {
        &self.claims
    }
}

impl ClaimSource for UnverifiedToken {
    fn claim_map(&self) -> &ClaimMap {
        &self.claims
    }
}

/// The four typed claims every token carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub email: String,
    pub token_type: TokenType,
    pub expiry: DateTime<Utc>,
    pub user_id: String,
}

impl TokenClaims {
    pub fn new(
        email: impl Into<String>,
        token_type: TokenType,
        expiry: DateTime<Utc>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            token_type,
            expiry,
            user_id: user_id.into(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }

    /// Claims to hand to the signer under the given schema
    pub fn to_claims(&self, keys: &ClaimKeys) -> Vec<Claim> {
        vec![
            Claim::new(keys.email.as_str(), self.email.as_str()),
            Claim::new(keys.token_type.as_str(), self.token_type),
            Claim::new(keys.expiry.as_str(), self.expiry),
            Claim::new(keys.user_id.as_str(), self.user_id.as_str()),
        ]
    }
}

/// Claims read from a token that passed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims(TokenClaims);

impl VerifiedClaims {
    pub(crate) fn new(claims: TokenClaims) -> Self {
        Self(claims)
    }

    pub fn into_inner(self) -> TokenClaims {
        self.0
    }
}

impl Deref for VerifiedClaims {
    type Target = TokenClaims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Claims read from a token whose signature was never checked.
///
/// Suitable for logging and diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnverifiedClaims(TokenClaims);

impl UnverifiedClaims {
    pub(crate) fn new(claims: TokenClaims) -> Self {
        Self(claims)
    }

    pub fn untrusted(&self) -> &TokenClaims {
        &self.0
    }

    pub fn into_untrusted(self) -> TokenClaims {
        self.0
    }
}

/// Read a Unix-seconds timestamp, truncating fractional seconds
pub(crate) fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    let Value::Number(number) = value else {
        return None;
    };
    let secs = match number.as_i64() {
        Some(secs) => secs,
        // Float-to-int casts saturate; out-of-range values fail below.
        None => number.as_f64().filter(|secs| secs.is_finite())?.trunc() as i64,
    };
    Utc.timestamp_opt(secs, 0).single()
}

/// Fetch a claim or report it missing
pub(crate) fn require_claim<'a>(claims: &'a ClaimMap, key: &str) -> Result<&'a Value, ClaimError> {
    claims.get(key).ok_or_else(|| ClaimError::MissingClaim {
        key: key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::claim::ClaimValue;
    use serde_json::json;

    #[test]
    fn test_to_claims_uses_schema_names() {
        let expiry = Utc.timestamp_opt(1_800_000_000, 0).unwrap();
        let claims = TokenClaims::new("a@b.com", TokenType::Access, expiry, "42");
        let keys = ClaimKeys {
            user_id: "sub".into(),
            ..ClaimKeys::default()
        };

        let signed = claims.to_claims(&keys);
        let keys_used: Vec<&str> = signed.iter().map(|claim| claim.key.as_str()).collect();
        assert_eq!(keys_used, ["email", "type", "exp", "sub"]);
        assert_eq!(signed[2].value, ClaimValue::Timestamp(expiry));
    }

    #[test]
    fn test_is_expired_at_boundary() {
        let expiry = Utc.timestamp_opt(1_800_000_000, 0).unwrap();
        let claims = TokenClaims::new("a@b.com", TokenType::Access, expiry, "42");
        assert!(claims.is_expired_at(expiry));
        assert!(!claims.is_expired_at(expiry - chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_timestamp_from_value() {
        let expected = Utc.timestamp_opt(1_700_000_000, 0).single();
        assert_eq!(timestamp_from_value(&json!(1_700_000_000)), expected);
        assert_eq!(timestamp_from_value(&json!(1_700_000_000.75)), expected);
        assert_eq!(timestamp_from_value(&json!("1700000000")), None);
        assert_eq!(timestamp_from_value(&json!(null)), None);
        assert_eq!(timestamp_from_value(&json!(1e300)), None);
    }

    #[test]
    fn test_require_claim() {
        let mut claims = ClaimMap::new();
        claims.insert("email".into(), json!("a@b.com"));
        assert_eq!(require_claim(&claims, "email").unwrap(), "a@b.com");
        assert_eq!(
            require_claim(&claims, "user_id"),
            Err(ClaimError::MissingClaim {
                key: "user_id".into()
            })
        );
    }
}
