//! # Per-Role Visibility Resolvers
//!
//! Pure, total, deterministic functions from a caller [`Identity`] to the
//! [`VisibilityFilter`] that scopes each entity collection. This is the one
//! authoritative statement of who sees what:
//!
//! - admin / project manager: unrestricted (customers still exclude
//!   soft-deleted rows by default; the explicit `including_deleted` scope
//!   on the SQL adapter is the privileged path around that).
//! - customer: rows transitively owned by their customer record.
//! - technician: rows transitively linked to tasks assigned to them.
//!
//! A customer-role identity with no owning customer id is malformed. The
//! resolvers fail closed with [`VisibilityFilter::Never`] and log the
//! invariant violation; they never widen to unrestricted and never abort
//! the request.

use tracing::error;

use super::filter::{FilterField, Relation, VisibilityFilter};
use crate::auth::Identity;
use crate::constants::Role;

/// Filter for the customers collection.
pub fn customer_visibility(identity: &Identity) -> VisibilityFilter {
    let not_deleted = VisibilityFilter::equals(FilterField::IsDeleted, false);
    match identity.role {
        Role::Admin | Role::ProjectManager => not_deleted,
        Role::Customer => match identity.customer_id {
            Some(customer_id) => {
                VisibilityFilter::equals(FilterField::Id, customer_id).and(not_deleted)
            }
            None => fail_closed(identity),
        },
        Role::Technician => VisibilityFilter::exists(
            Relation::Projects,
            VisibilityFilter::exists(
                Relation::Tasks,
                VisibilityFilter::equals(FilterField::AssignedToUserId, identity.user_id),
            ),
        )
        .and(not_deleted),
    }
}

/// Filter for the projects collection.
pub fn project_visibility(identity: &Identity) -> VisibilityFilter {
    match identity.role {
        Role::Admin | Role::ProjectManager => VisibilityFilter::All,
        Role::Customer => match identity.customer_id {
            Some(customer_id) => VisibilityFilter::equals(FilterField::CustomerId, customer_id),
            None => fail_closed(identity),
        },
        Role::Technician => VisibilityFilter::exists(
            Relation::Tasks,
            VisibilityFilter::equals(FilterField::AssignedToUserId, identity.user_id),
        ),
    }
}

/// Filter for the tasks collection.
pub fn task_visibility(identity: &Identity) -> VisibilityFilter {
    match identity.role {
        Role::Admin | Role::ProjectManager => VisibilityFilter::All,
        Role::Technician => {
            VisibilityFilter::equals(FilterField::AssignedToUserId, identity.user_id)
        }
        Role::Customer => match identity.customer_id {
            Some(customer_id) => VisibilityFilter::exists(
                Relation::Project,
                VisibilityFilter::equals(FilterField::CustomerId, customer_id),
            ),
            None => fail_closed(identity),
        },
    }
}

/// Zero-row filter for a malformed identity, reported as an upstream bug
/// rather than masked as an ordinary denial.
fn fail_closed(identity: &Identity) -> VisibilityFilter {
    error!(
        user_id = %identity.user_id,
        role = %identity.role,
        "identity invariant violated: customer role without customer id; scoping to zero rows"
    );
    VisibilityFilter::Never
}
