//! Application state and factory
//!
//! This module holds the shared application state and builds the Actix-web
//! application around it.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error, HttpResponse,
};
use sigil_core::{Authenticator, KeyManager, TokenType, TokenTypePolicy};
use sigil_infra::InfrastructureServices;
use sigil_shared::errors::{error_codes, ErrorResponse};
use tracing_actix_web::TracingLogger;

use crate::middleware::auth::JwtAuth;
use crate::routes::{auth, health};

/// State shared by every worker
pub struct AppState {
    pub key_manager: Arc<KeyManager>,
    /// Authenticator used by routes that require an access token
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(key_manager: Arc<KeyManager>, authenticator: Authenticator) -> Self {
        Self {
            key_manager,
            authenticator,
        }
    }

    pub fn from_services(services: &InfrastructureServices) -> Self {
        Self::new(
            Arc::clone(&services.key_manager),
            services.authenticator(TokenTypePolicy::Only(TokenType::Access)),
        )
    }
}

/// Create and configure the application
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let jwt_auth = JwtAuth::new(state.authenticator.clone());

    App::new()
        .app_data(state)
        .wrap(TracingLogger::default())
        // Health check endpoint
        .route("/health", web::get().to(health::health_check))
        // API v1 routes
        .service(
            web::scope("/api/v1/auth")
                .route("/public-key", web::get().to(auth::public_key))
                .service(
                    web::resource("/me")
                        .wrap(jwt_auth)
                        .route(web::get().to(auth::me)),
                ),
        )
        .default_service(web::route().to(not_found))
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
