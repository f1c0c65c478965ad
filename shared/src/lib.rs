//! Shared types and calculations for the shrimp processing ERP
//!
//! This crate holds the pure calculation core (grade conversion and floor
//! balance) shared between the backend, the browser (via WASM) and tests.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::*;
