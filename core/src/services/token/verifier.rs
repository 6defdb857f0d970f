//! RS256 token verification

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use rsa::pkcs1::EncodeRsaPublicKey;
use rsa::traits::PublicKeyParts;
use serde::Deserialize;
use sigil_shared::{ClaimKeys, MIN_RSA_KEY_BITS};

use super::traits::TokenVerifierTrait;
use crate::domain::entities::token::timestamp_from_value;
use crate::domain::entities::{ClaimMap, VerifiedToken};
use crate::errors::{KeyError, VerificationError};
use crate::services::keys::{decode_public_key_pem, KeyManager};

/// Tokens longer than this are rejected before any decoding
pub const MAX_TOKEN_SIZE_BYTES: usize = 8 * 1024;

/// Signature algorithms of the RSA family accepted in token headers
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

#[derive(Clone)]
enum VerificationKey {
    Managed(Arc<KeyManager>),
    Static(Arc<DecodingKey>),
}

/// Checks token signatures, algorithms and expiry
#[derive(Clone)]
pub struct TokenVerifier {
    key: VerificationKey,
    claim_keys: ClaimKeys,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = match &self.key {
            VerificationKey::Managed(manager) => format!("{:?}", manager),
            VerificationKey::Static(_) => String::from("static public key"),
        };
        f.debug_struct("TokenVerifier")
            .field("key", &key)
            .field("claim_keys", &self.claim_keys)
            .finish()
    }
}

impl TokenVerifier {
    /// Verify with whatever pair `key_manager` holds at call time
    pub fn new(key_manager: Arc<KeyManager>, claim_keys: ClaimKeys) -> Self {
        Self {
            key: VerificationKey::Managed(key_manager),
            claim_keys,
            validation: rsa_validation(),
        }
    }

    /// Verify against a distributed public key.
    ///
    /// Accepts PKCS#1 (`RSA PUBLIC KEY`) or SubjectPublicKeyInfo
    /// (`PUBLIC KEY`) PEM.
    pub fn from_public_key_pem(pem: &str, claim_keys: ClaimKeys) -> Result<Self, KeyError> {
        let public_key = decode_public_key_pem(pem, "public key PEM")?;
        let bits = public_key.n().bits();
        if bits < MIN_RSA_KEY_BITS {
            return Err(KeyError::WeakKey {
                bits,
                minimum: MIN_RSA_KEY_BITS,
            });
        }

        let der = public_key.to_pkcs1_der().map_err(|e| KeyError::Encoding {
            message: e.to_string(),
        })?;

        Ok(Self {
            key: VerificationKey::Static(Arc::new(DecodingKey::from_rsa_der(der.as_bytes()))),
            claim_keys,
            validation: rsa_validation(),
        })
    }

    pub fn claim_keys(&self) -> &ClaimKeys {
        &self.claim_keys
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`.
    ///
    /// The header algorithm is checked before any signature work, so tokens
    /// declaring `none` or an HMAC algorithm fail with `AlgorithmMismatch`.
    /// The expiry claim must be numeric and strictly after `now`.
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<VerifiedToken, VerificationError> {
        let result = self.check(token, now);
        if let Err(err) = &result {
            tracing::debug!(
                reason = %err,
                event = "token_rejected",
                "Token verification failed"
            );
        }
        result
    }

    fn check(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, VerificationError> {
        let algorithm = header_algorithm(token)?;
        let accepted = Algorithm::from_str(&algorithm)
            .map(|alg| ACCEPTED_ALGORITHMS.contains(&alg))
            .unwrap_or(false);
        if !accepted {
            return Err(VerificationError::AlgorithmMismatch { algorithm });
        }

        let data: TokenData<ClaimMap> = match &self.key {
            VerificationKey::Managed(manager) => {
                let key_pair = manager.key_pair();
                decode(token, key_pair.decoding_key(), &self.validation)
            }
            VerificationKey::Static(key) => decode(token, key, &self.validation),
        }
        .map_err(map_decode_error)?;

        let expiry = data
            .claims
            .get(&self.claim_keys.expiry)
            .and_then(timestamp_from_value)
            .ok_or(VerificationError::MissingOrInvalidExpiry)?;
        if expiry <= now {
            return Err(VerificationError::Expired);
        }

        Ok(VerifiedToken::new(data.header, data.claims))
    }
}

impl TokenVerifierTrait for TokenVerifier {
    fn verify(&self, token: &str) -> Result<VerifiedToken, VerificationError> {
        TokenVerifier::verify(self, token)
    }
}

fn rsa_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    // Expiry is checked by the verifier against its configured claim name.
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();
    validation
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Split off and decode the header, returning its declared algorithm
pub(super) fn header_algorithm(token: &str) -> Result<String, VerificationError> {
    check_shape(token)?;
    let header = token.split('.').next().unwrap_or_default();
    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| VerificationError::MalformedToken)?;
    let raw: RawHeader =
        serde_json::from_slice(&bytes).map_err(|_| VerificationError::MalformedToken)?;
    Ok(raw.alg)
}

/// Reject oversized input and anything without exactly three segments
pub(super) fn check_shape(token: &str) -> Result<(), VerificationError> {
    if token.len() > MAX_TOKEN_SIZE_BYTES || token.split('.').count() != 3 {
        return Err(VerificationError::MalformedToken);
    }
    Ok(())
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> VerificationError {
    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidRsaKey(_)
        | ErrorKind::InvalidKeyFormat => VerificationError::SignatureInvalid,
        _ => VerificationError::MalformedToken,
    }
}
