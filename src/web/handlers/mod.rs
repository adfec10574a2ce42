//! HTTP request handlers. Every protected handler receives the caller
//! [`crate::auth::Identity`] from the session middleware and funnels
//! guard → scope/authorizer → store → audit, in that order.

pub mod auth;
pub mod customers;
pub mod documents;
pub mod projects;
pub mod tasks;
