//! RS256 token signing

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use serde_json::Value;
use sigil_shared::ClaimKeys;
use uuid::Uuid;

use crate::domain::entities::{Claim, ClaimMap};
use crate::errors::SigningError;
use crate::services::keys::KeyManager;

/// Signs claim sets with the manager's active private key
#[derive(Debug, Clone)]
pub struct TokenSigner {
    key_manager: Arc<KeyManager>,
    claim_keys: ClaimKeys,
}

impl TokenSigner {
    pub fn new(key_manager: Arc<KeyManager>, claim_keys: ClaimKeys) -> Self {
        Self {
            key_manager,
            claim_keys,
        }
    }

    pub fn claim_keys(&self) -> &ClaimKeys {
        &self.claim_keys
    }

    /// Sign `claims` with an issued-at of now
    pub fn sign(&self, claims: &[Claim]) -> Result<String, SigningError> {
        self.sign_at(claims, Utc::now())
    }

    /// Sign `claims`, stamping `issued_at` and a fresh random nonce.
    ///
    /// Callers may not supply the issued-at or nonce claims themselves, and
    /// may not repeat a key.
    pub fn sign_at(
        &self,
        claims: &[Claim],
        issued_at: DateTime<Utc>,
    ) -> Result<String, SigningError> {
        let payload = self.build_payload(claims, issued_at)?;

        let key_pair = self.key_manager.key_pair();
        let token = encode(&Header::new(Algorithm::RS256), &payload, key_pair.encoding_key())
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    event = "token_signing_failed",
                    "Failed to sign token"
                );
                SigningError::Signature {
                    message: e.to_string(),
                }
            })?;

        tracing::debug!(
            claim_count = claims.len(),
            event = "token_signed",
            "Token signed"
        );
        Ok(token)
    }

    fn build_payload(
        &self,
        claims: &[Claim],
        issued_at: DateTime<Utc>,
    ) -> Result<ClaimMap, SigningError> {
        let mut payload = ClaimMap::new();
        for claim in claims {
            if self.claim_keys.is_reserved(&claim.key) {
                return Err(SigningError::ReservedClaim {
                    key: claim.key.clone(),
                });
            }
            if payload.insert(claim.key.clone(), claim.value.to_json()).is_some() {
                return Err(SigningError::DuplicateClaim {
                    key: claim.key.clone(),
                });
            }
        }

        payload.insert(
            self.claim_keys.issued_at.clone(),
            Value::from(issued_at.timestamp()),
        );
        payload.insert(
            self.claim_keys.nonce.clone(),
            Value::String(Uuid::new_v4().to_string()),
        );
        Ok(payload)
    }
}
