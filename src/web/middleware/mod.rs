//! Middleware for the web adapter.

pub mod auth;

pub use auth::{require_roles, require_session};
