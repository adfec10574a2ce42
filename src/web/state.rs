//! Shared application state for the web adapter.

use std::sync::Arc;

use sqlx::PgPool;

use crate::audit::AuditSink;
use crate::auth::{JwtVerifier, SessionGuard};
use crate::storage::BlobStore;

/// Cheaply clonable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub guard: SessionGuard,
    /// Kept alongside the guard for the login path, which issues tokens.
    pub tokens: JwtVerifier,
    pub audit: Arc<dyn AuditSink>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        tokens: JwtVerifier,
        audit: Arc<dyn AuditSink>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let guard = SessionGuard::new(Arc::new(tokens.clone()));
        AppState {
            pool,
            guard,
            tokens,
            audit,
            blobs,
        }
    }
}
