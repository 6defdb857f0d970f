//! HTTP surface for Sigil, exported for the binary and integration tests.

pub mod app;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;
