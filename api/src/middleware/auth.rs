//! JWT authentication middleware for protecting API endpoints.
//!
//! This middleware extracts the bearer token from the Authorization header,
//! runs it through the core [`Authenticator`] and stores the verified claims
//! in the request extensions. Rejected requests get a 401 `ErrorResponse`.

use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, ResponseError,
};
use futures_util::future::LocalBoxFuture;
use sigil_core::errors::AuthError;
use sigil_core::{Authenticator, TokenType, VerifiedClaims};

use crate::handlers::ApiError;

/// Authenticated caller, available to handlers behind [`JwtAuth`]
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: VerifiedClaims,
}

impl AuthContext {
    pub fn user_id(&self) -> &str {
        &self.claims.user_id
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }

    pub fn token_type(&self) -> TokenType {
        self.claims.token_type
    }
}

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    authenticator: Arc<Authenticator>,
}

impl JwtAuth {
    pub fn new(authenticator: Authenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            authenticator: Arc::clone(&self.authenticator),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    authenticator: Arc<Authenticator>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        match self.authenticator.authenticate_header(header) {
            Ok(claims) => {
                req.extensions_mut().insert(AuthContext { claims });
                let service = Rc::clone(&self.service);
                Box::pin(async move {
                    let response = service.call(req).await?;
                    Ok(response.map_into_left_body())
                })
            }
            Err(err) => {
                tracing::debug!(
                    path = %req.path(),
                    error_code = err.error_code(),
                    event = "request_unauthenticated",
                    "Rejected request without valid credentials"
                );
                let response = ApiError::from(err).error_response();
                Box::pin(async move { Ok(req.into_response(response).map_into_right_body()) })
            }
        }
    }
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or(ApiError(AuthError::MissingCredentials));

        ready(result)
    }
}
