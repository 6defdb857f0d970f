//! Shared fixtures for API integration tests

use std::sync::Arc;

use actix_web::web;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use sigil_api::app::AppState;
use sigil_core::{
    Authenticator, KeyManager, MemoryFileSystem, TokenClaims, TokenInspector, TokenSigner,
    TokenType, TokenTypePolicy, TokenVerifier,
};
use sigil_shared::ClaimKeys;

pub static KEY_MANAGER: Lazy<Arc<KeyManager>> = Lazy::new(|| {
    Arc::new(KeyManager::load("/keys", Arc::new(MemoryFileSystem::new())).unwrap())
});

pub fn authenticator() -> Authenticator {
    let verifier = TokenVerifier::new(KEY_MANAGER.clone(), ClaimKeys::default());
    Authenticator::new(Arc::new(verifier), TokenInspector::default())
        .with_policy(TokenTypePolicy::Only(TokenType::Access))
}

pub fn state() -> web::Data<AppState> {
    web::Data::new(AppState::new(KEY_MANAGER.clone(), authenticator()))
}

pub fn expiry_in(minutes: i64) -> DateTime<Utc> {
    let at = Utc::now() + Duration::minutes(minutes);
    DateTime::from_timestamp(at.timestamp(), 0).unwrap()
}

pub fn issue(token_type: TokenType, expiry: DateTime<Utc>) -> String {
    let keys = ClaimKeys::default();
    let claims = TokenClaims::new("a@b.com", token_type, expiry, "42");
    TokenSigner::new(KEY_MANAGER.clone(), keys.clone())
        .sign(&claims.to_claims(&keys))
        .unwrap()
}
