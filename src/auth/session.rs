//! # Session Guard
//!
//! The single choke point every state-accessing operation passes through
//! before any handler logic runs. Resolves the caller identity from the
//! bearer token and, when an endpoint declares a role allow-list, enforces
//! membership. Read-only: the guard has no side effects beyond logging.

use std::sync::Arc;

use tracing::{debug, warn};

use super::identity::Identity;
use super::token::TokenVerifier;
use crate::constants::Role;
use crate::error::Denial;

/// Validates inbound sessions ahead of all data access.
#[derive(Clone)]
pub struct SessionGuard {
    verifier: Arc<dyn TokenVerifier>,
}

impl SessionGuard {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        SessionGuard { verifier }
    }

    /// Resolve and authorize the caller.
    ///
    /// - No token, or a token the verifier rejects, is an
    ///   unauthenticated denial. A verifier failure is always a deny,
    ///   never an allow.
    /// - With `allowed` given, a known identity outside the list is a
    ///   forbidden denial.
    /// - A malformed identity (customer role without an owning customer
    ///   id) still passes the guard; every scope resolver fails closed on
    ///   it. It is logged here as an invariant violation so it shows up
    ///   distinctly from ordinary denials.
    pub fn authorize(
        &self,
        bearer: Option<&str>,
        allowed: Option<&[Role]>,
    ) -> Result<Identity, Denial> {
        let raw = bearer.ok_or_else(|| Denial::unauthenticated("missing session token"))?;

        let identity = self
            .verifier
            .verify(raw)
            .ok_or_else(|| Denial::unauthenticated("invalid or expired session token"))?;

        if let Err(e) = identity.validate() {
            warn!(error = %e, user_id = %identity.user_id, "malformed identity passed verification");
        }

        if let Some(allowed) = allowed {
            if !identity.role.can_access(allowed) {
                debug!(
                    user_id = %identity.user_id,
                    role = %identity.role,
                    "role not in endpoint allow-list"
                );
                return Err(Denial::forbidden("role not permitted for this operation"));
            }
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Verifier double that returns a fixed identity and counts calls.
    struct FixedVerifier {
        identity: Option<Identity>,
        calls: AtomicUsize,
    }

    impl TokenVerifier for FixedVerifier {
        fn verify(&self, _raw: &str) -> Option<Identity> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.identity.clone()
        }
    }

    fn guard_with(identity: Option<Identity>) -> (SessionGuard, Arc<FixedVerifier>) {
        let verifier = Arc::new(FixedVerifier {
            identity,
            calls: AtomicUsize::new(0),
        });
        (SessionGuard::new(verifier.clone()), verifier)
    }

    #[test]
    fn missing_token_is_unauthenticated_without_touching_the_verifier() {
        let (guard, verifier) = guard_with(Some(Identity::staff(Uuid::new_v4(), Role::Admin)));
        let denial = guard.authorize(None, None).unwrap_err();
        assert!(denial.is_unauthenticated());
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn rejected_token_is_unauthenticated() {
        let (guard, _) = guard_with(None);
        let denial = guard.authorize(Some("whatever"), None).unwrap_err();
        assert!(denial.is_unauthenticated());
    }

    #[test]
    fn valid_token_resolves_identity() {
        let identity = Identity::customer(Uuid::new_v4(), Uuid::new_v4());
        let (guard, _) = guard_with(Some(identity.clone()));
        assert_eq!(guard.authorize(Some("token"), None).unwrap(), identity);
    }

    #[test]
    fn allow_list_violations_are_forbidden_not_unauthenticated() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Technician);
        let (guard, _) = guard_with(Some(identity));
        let denial = guard
            .authorize(Some("token"), Some(&[Role::Admin]))
            .unwrap_err();
        assert!(denial.is_forbidden());
    }

    #[test]
    fn allow_list_admits_listed_roles() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Admin);
        let (guard, _) = guard_with(Some(identity.clone()));
        let resolved = guard
            .authorize(Some("token"), Some(&[Role::Admin, Role::ProjectManager]))
            .unwrap();
        assert_eq!(resolved, identity);
    }
}
