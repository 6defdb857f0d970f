//! Services for key custody and the token lifecycle.

pub mod keys;
pub mod token;
