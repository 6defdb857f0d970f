//! # Infrastructure Layer
//!
//! This crate provides the concrete pieces the Sigil core needs at runtime:
//! - **Filesystem**: atomic, permission-aware key file storage
//! - **Services**: a container wiring the key manager, signer, verifier and
//!   inspector from configuration

use std::sync::Arc;

use sigil_core::errors::KeyError;
use sigil_core::{
    Authenticator, KeyManager, TokenInspector, TokenSigner, TokenTypePolicy, TokenVerifier,
};
use sigil_shared::JwtConfig;

pub mod fs;

pub use fs::OsFileSystem;

/// Load (or create) the key pair described by `config` on the local disk
pub fn load_key_manager(config: &JwtConfig) -> Result<Arc<KeyManager>, KeyError> {
    KeyManager::from_config(config, Arc::new(OsFileSystem::new())).map(Arc::new)
}

/// Infrastructure service container
#[derive(Debug, Clone)]
pub struct InfrastructureServices {
    pub key_manager: Arc<KeyManager>,
    pub signer: TokenSigner,
    pub verifier: Arc<TokenVerifier>,
    pub inspector: TokenInspector,
}

impl InfrastructureServices {
    /// Wire every token service around one shared key manager
    pub fn new(key_manager: Arc<KeyManager>, config: &JwtConfig) -> Self {
        let claim_keys = config.claim_keys.clone();
        Self {
            signer: TokenSigner::new(Arc::clone(&key_manager), claim_keys.clone()),
            verifier: Arc::new(TokenVerifier::new(
                Arc::clone(&key_manager),
                claim_keys.clone(),
            )),
            inspector: TokenInspector::new(claim_keys),
            key_manager,
        }
    }

    /// Load keys from disk and build the services
    pub fn from_config(config: &JwtConfig) -> Result<Self, InfrastructureError> {
        if !config.has_valid_key_bits() {
            return Err(InfrastructureError::Config(format!(
                "JWT key size {} is below the supported minimum",
                config.key_bits
            )));
        }
        let key_manager = load_key_manager(config)?;
        Ok(Self::new(key_manager, config))
    }

    /// Authenticator for endpoints that accept tokens allowed by `policy`
    pub fn authenticator(&self, policy: TokenTypePolicy) -> Authenticator {
        Authenticator::new(self.verifier.clone(), self.inspector.clone()).with_policy(policy)
    }
}

/// Initialize infrastructure services for an application's JWT settings
///
/// Loads the key pair from `config.key_directory`, generating one on first
/// start, and wires the token services around it.
pub fn initialize(config: &JwtConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        key_directory = %config.key_directory,
        key_bits = config.key_bits,
        event = "infrastructure_initializing",
        "Initializing key storage and token services"
    );

    let services = InfrastructureServices::from_config(config)?;

    tracing::info!(
        event = "infrastructure_initialized",
        "Infrastructure services initialized successfully"
    );
    Ok(services)
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Key material could not be loaded or created
    #[error(transparent)]
    Key(#[from] KeyError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
