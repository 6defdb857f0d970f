use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::app::AppState;

/// Response body of `GET /api/v1/auth/public-key`
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    /// PKCS#1 PEM of the active public key
    pub public_key: String,
    pub algorithm: String,
}

/// Publish the active public key so other services can verify tokens.
///
/// Reads the key at request time, so a rotation is visible immediately.
pub async fn public_key(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(PublicKeyResponse {
        public_key: state.key_manager.export_public_key(),
        algorithm: String::from("RS256"),
    })
}
