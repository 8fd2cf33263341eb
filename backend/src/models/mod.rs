//! Domain models for the Brewpos backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
