//! HTTP API for the browser front-end.
//!
//! A composable axum `Router` mounted under `/api/`: login and health are
//! open, everything else requires the bearer session token.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
