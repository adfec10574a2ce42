//! Caller identity, reconstructed from the verified session token on every
//! request. Never persisted by this crate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::Role;
use crate::error::LiftopsError;

/// The authenticated caller.
///
/// `customer_id` is the owning customer record and is only meaningful for
/// [`Role::Customer`] identities. A customer identity without it is
/// malformed: [`Identity::validate`] reports it, and every scope resolver
/// treats it as matching zero rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
    pub customer_id: Option<Uuid>,
}

impl Identity {
    /// Staff identity (admin, project manager, or technician).
    pub fn staff(user_id: Uuid, role: Role) -> Self {
        Identity {
            user_id,
            role,
            customer_id: None,
        }
    }

    /// Customer-portal identity tied to its owning customer record.
    pub fn customer(user_id: Uuid, customer_id: Uuid) -> Self {
        Identity {
            user_id,
            role: Role::Customer,
            customer_id: Some(customer_id),
        }
    }

    /// Check the role/ownership invariant. A violation is an upstream bug
    /// (token issuance or user provisioning), not a normal denial.
    pub fn validate(&self) -> Result<(), LiftopsError> {
        if self.role == Role::Customer && self.customer_id.is_none() {
            return Err(LiftopsError::InvalidState(format!(
                "customer identity {} has no owning customer id",
                self.user_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_identities_validate() {
        for role in [Role::Admin, Role::ProjectManager, Role::Technician] {
            assert!(Identity::staff(Uuid::new_v4(), role).validate().is_ok());
        }
    }

    #[test]
    fn customer_identity_requires_owning_customer() {
        let ok = Identity::customer(Uuid::new_v4(), Uuid::new_v4());
        assert!(ok.validate().is_ok());

        let malformed = Identity {
            user_id: Uuid::new_v4(),
            role: Role::Customer,
            customer_id: None,
        };
        assert!(matches!(
            malformed.validate(),
            Err(LiftopsError::InvalidState(_))
        ));
    }
}
