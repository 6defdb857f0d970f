use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sigil_core::TokenType;

use crate::middleware::auth::AuthContext;

/// Response body of `GET /api/v1/auth/me`
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: String,
    pub email: String,
    pub token_type: TokenType,
    pub expires_at: DateTime<Utc>,
}

/// Echo the verified identity of the caller
pub async fn me(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(MeResponse {
        user_id: auth.user_id().to_string(),
        email: auth.email().to_string(),
        token_type: auth.token_type(),
        expires_at: auth.claims.expiry,
    })
}
