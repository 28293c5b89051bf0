//! site-core: Shared infrastructure for the promotional-site backend.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use serde;
pub use tracing;
pub use validator;
