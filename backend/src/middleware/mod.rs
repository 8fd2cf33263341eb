//! Request middleware for the Brewpos backend

pub mod auth;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
