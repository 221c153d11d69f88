// src/lib.rs
// HtREST - REST API for Heliotherm heat pumps

pub mod api;
pub mod coercion;
pub mod config;
pub mod device;
pub mod error;
pub mod session;
pub mod state;

pub use error::{HtError, Result};
