//! Domain layer containing the token model.

pub mod entities;
