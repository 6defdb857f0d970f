//! Authentication routes
//!
//! - `GET /api/v1/auth/public-key` - the active verification key
//! - `GET /api/v1/auth/me` - claims of the authenticated caller

pub mod me;
pub mod public_key;

pub use me::{me, MeResponse};
pub use public_key::{public_key, PublicKeyResponse};
