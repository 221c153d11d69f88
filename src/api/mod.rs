// src/api/mod.rs
// REST surface of the heat pump under /api/v1

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;

pub use error::{ApiError, ApiResult};
pub use router::create_router;
