//! # Session Middleware
//!
//! Applied to every protected route. Extracts the bearer token, runs the
//! session guard, and stashes the resolved [`Identity`] in request
//! extensions for handlers. Handlers never see a request that did not pass
//! the guard.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::auth::Identity;
use crate::constants::Role;
use crate::error::Denial;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// Authentication middleware for protected endpoints.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let bearer = bearer_token(&request);
    let identity = state.guard.authorize(bearer, None)?;

    debug!(user_id = %identity.user_id, role = %identity.role, "authenticated request");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Per-endpoint allow-list check, for routes stricter than "any session".
pub fn require_roles(identity: &Identity, allowed: &[Role]) -> Result<(), Denial> {
    if identity.role.can_access(allowed) {
        Ok(())
    } else {
        Err(Denial::forbidden("role not permitted for this operation"))
    }
}

/// Extract the Bearer token from the Authorization header, if any.
fn bearer_token(request: &Request) -> Option<&str> {
    let header = request.headers().get("authorization")?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
