//! # Error Taxonomy
//!
//! Two families of failure live here and they are deliberately kept apart:
//!
//! - [`Denial`] is a *value* describing a refused operation. The session
//!   guard and the mutation authorizer return denials so callers can map
//!   them onto 401/403 responses without unwinding.
//! - [`LiftopsError`] covers genuine faults: database errors, bad
//!   configuration, and invariant violations (`InvalidState`) that indicate
//!   an upstream bug rather than a normal access-control boundary.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Error, Debug)]
pub enum LiftopsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value that the closed role/identity model should have made
    /// impossible: unknown role string, customer identity without an owning
    /// customer id. Always fails closed; logged distinctly from a
    /// legitimate denial.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, LiftopsError>;

/// Why an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    /// No caller identity: missing, invalid, or expired token. Maps to 401.
    Unauthenticated,
    /// Identity known, operation not permitted. Maps to 403.
    Forbidden,
}

/// A refused operation, returned as a value rather than thrown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    pub kind: DenialKind,
    pub reason: &'static str,
}

impl Denial {
    pub fn unauthenticated(reason: &'static str) -> Self {
        Denial {
            kind: DenialKind::Unauthenticated,
            reason,
        }
    }

    pub fn forbidden(reason: &'static str) -> Self {
        Denial {
            kind: DenialKind::Forbidden,
            reason,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.kind == DenialKind::Unauthenticated
    }

    pub fn is_forbidden(&self) -> bool {
        self.kind == DenialKind::Forbidden
    }
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            DenialKind::Unauthenticated => write!(f, "unauthenticated: {}", self.reason),
            DenialKind::Forbidden => write!(f, "forbidden: {}", self.reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_kinds_are_distinct() {
        let unauth = Denial::unauthenticated("no token");
        let forbidden = Denial::forbidden("role not allowed");
        assert!(unauth.is_unauthenticated());
        assert!(!unauth.is_forbidden());
        assert!(forbidden.is_forbidden());
        assert_ne!(unauth, forbidden);
    }

    #[test]
    fn invalid_state_formats_with_context() {
        let err = LiftopsError::InvalidState("customer identity without customer id".into());
        assert!(err.to_string().contains("Invalid state"));
    }
}
