//! Conversion of core errors into HTTP responses

use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sigil_core::errors::{AuthError, ErrorClass};
use sigil_shared::errors::IntoErrorResponse;

/// Wrapper that lets handlers return [`AuthError`] directly
#[derive(Debug)]
pub struct ApiError(pub AuthError);

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// HTTP status for an error class
pub fn status_for(class: ErrorClass) -> StatusCode {
    match class {
        ErrorClass::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorClass::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.0.class())
    }

    fn error_response(&self) -> HttpResponse {
        if self.0.is_internal() {
            tracing::error!(
                error = %self.0,
                event = "internal_auth_error",
                "Authentication request failed internally"
            );
        }
        HttpResponse::build(self.status_code()).json(self.0.to_error_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_core::errors::{KeyError, SigningError, VerificationError};

    #[test]
    fn test_status_mapping() {
        let expired = ApiError::from(AuthError::from(VerificationError::Expired));
        assert_eq!(expired.status_code(), StatusCode::UNAUTHORIZED);

        let reserved = ApiError::from(AuthError::from(SigningError::ReservedClaim {
            key: "nonce".into(),
        }));
        assert_eq!(reserved.status_code(), StatusCode::BAD_REQUEST);

        let weak = ApiError::from(AuthError::from(KeyError::WeakKey {
            bits: 1024,
            minimum: 2048,
        }));
        assert_eq!(weak.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_credentials_is_unauthorized() {
        let err = ApiError::from(AuthError::MissingCredentials);
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Missing bearer token");
    }
}
