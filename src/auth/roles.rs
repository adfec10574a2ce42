//! Role capability predicates.
//!
//! The two policy questions the rest of the crate is allowed to ask about a
//! role live here, so "who can manage records" has exactly one definition
//! and one test surface instead of ad hoc comparisons at call sites.

use crate::constants::Role;

impl Role {
    /// True for the roles allowed to create, update, and delete customer,
    /// building, project, task, and document records.
    pub fn is_record_manager(self) -> bool {
        matches!(self, Role::Admin | Role::ProjectManager)
    }

    /// Endpoint allow-list membership, used by the session guard.
    pub fn can_access(self, allowed: &[Role]) -> bool {
        allowed.contains(&self)
    }
}
