//! Shared configuration and response types for the Sigil workspace
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types (JWT keys, claim schema, server, logging)
//! - The error response body returned at the HTTP edge

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ClaimKeys, Environment, JwtConfig, LogFormat, LoggingConfig, ServerConfig,
    MIN_RSA_KEY_BITS,
};
pub use errors::{error_codes, ApiResult, ConfigError, ErrorResponse, IntoErrorResponse};
