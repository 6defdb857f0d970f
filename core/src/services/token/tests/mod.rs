mod authenticator_tests;
mod inspector_tests;

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use serde_json::Value;
use sigil_shared::ClaimKeys;

use crate::domain::entities::{Claim, TokenType};
use crate::services::keys::{KeyManager, MemoryFileSystem};
use crate::services::token::{TokenInspector, TokenSigner, TokenVerifier};

/// Key pair shared by tests that never rotate it
pub(super) static KEY_MANAGER: Lazy<Arc<KeyManager>> = Lazy::new(new_key_manager);

/// Unrelated key pair for cross-key checks
pub(super) static OTHER_KEY_MANAGER: Lazy<Arc<KeyManager>> = Lazy::new(new_key_manager);

pub(super) fn new_key_manager() -> Arc<KeyManager> {
    Arc::new(KeyManager::load("/keys", Arc::new(MemoryFileSystem::new())).unwrap())
}

pub(super) fn signer() -> TokenSigner {
    TokenSigner::new(KEY_MANAGER.clone(), ClaimKeys::default())
}

pub(super) fn verifier() -> TokenVerifier {
    TokenVerifier::new(KEY_MANAGER.clone(), ClaimKeys::default())
}

pub(super) fn inspector() -> TokenInspector {
    TokenInspector::new(ClaimKeys::default())
}

pub(super) fn in_one_hour() -> DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

/// Claims for user "42" with an access token
pub(super) fn access_claims(expiry: DateTime<Utc>) -> Vec<Claim> {
    vec![
        Claim::new("email", "a@b.com"),
        Claim::new("type", TokenType::Access),
        Claim::new("exp", expiry),
        Claim::new("user_id", "42"),
    ]
}

/// Flip the low bit of a payload character, keeping the token's shape
pub(super) fn tamper_payload(token: &str) -> String {
    let mut bytes = token.as_bytes().to_vec();
    let payload_start = token.find('.').unwrap() + 1;
    bytes[payload_start + 5] ^= 0x01;
    String::from_utf8(bytes).unwrap()
}

/// Number of bits in the decoded payload segment
pub(super) fn payload_bit_count(token: &str) -> usize {
    let payload = token.split('.').nth(1).unwrap();
    URL_SAFE_NO_PAD.decode(payload).unwrap().len() * 8
}

/// Flip one bit of the decoded payload and re-encode it
pub(super) fn flip_payload_bit(token: &str, bit: usize) -> String {
    let segments: Vec<&str> = token.split('.').collect();
    let mut payload = URL_SAFE_NO_PAD.decode(segments[1]).unwrap();
    payload[bit / 8] ^= 1 << (bit % 8);
    format!(
        "{}.{}.{}",
        segments[0],
        URL_SAFE_NO_PAD.encode(payload),
        segments[2]
    )
}

/// Replace the first signature character with a different valid one
pub(super) fn tamper_signature(token: &str) -> String {
    let signature_start = token.rfind('.').unwrap() + 1;
    let replacement = if token.as_bytes()[signature_start] == b'A' { "B" } else { "A" };
    let mut tampered = token.to_string();
    tampered.replace_range(signature_start..signature_start + 1, replacement);
    tampered
}

pub(super) fn encode_segment(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
}
