//! # Mutation Authorizer
//!
//! Per-write checks layered on top of row visibility. Seeing a row is
//! necessary but not sufficient for writing it; this module is the one
//! place those write rules live:
//!
//! - record create/update/delete: record managers only
//! - task updates: managers freely; a technician on their own task, but
//!   only status/schedule fields
//! - customer soft-delete and anonymization: admin only
//!
//! The authorizer is pure and must be consulted strictly before the
//! persistence write it gates. A denial short-circuits: no store call, no
//! `*.create`/`*.update` audit event (at most an `access_denied` entry,
//! recorded by the caller).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Identity;
use crate::constants::{Role, TaskStatus};
use crate::error::Denial;
use crate::models::Task;

/// Entity families whose records the record-manager rule covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Customer,
    Building,
    Project,
    Task,
    Document,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Customer => "customer",
            RecordKind::Building => "building",
            RecordKind::Project => "project",
            RecordKind::Task => "task",
            RecordKind::Document => "document",
        }
    }
}

/// Partial task update. Which fields are present determines who may apply
/// it: status and schedule are open to the assigned technician, the rest
/// are manager-only details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub assigned_to_user_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl TaskPatch {
    /// True when the patch touches any manager-only field.
    pub fn touches_details(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.assigned_to_user_id.is_some()
            || self.project_id.is_some()
    }

    pub fn is_empty(&self) -> bool {
        !self.touches_details() && self.status.is_none() && self.scheduled_for.is_none()
    }
}

/// An attempted write, described precisely enough to decide it.
#[derive(Debug)]
pub enum Mutation<'a> {
    CreateRecord(RecordKind),
    UpdateRecord(RecordKind),
    UpdateTask { task: &'a Task, patch: &'a TaskPatch },
    DeleteCustomer { anonymize: bool },
}

impl Mutation<'_> {
    /// Entity family, for audit metadata.
    pub fn record_kind(&self) -> RecordKind {
        match self {
            Mutation::CreateRecord(kind) | Mutation::UpdateRecord(kind) => *kind,
            Mutation::UpdateTask { .. } => RecordKind::Task,
            Mutation::DeleteCustomer { .. } => RecordKind::Customer,
        }
    }
}

/// Decide an attempted write. `Ok(())` means the caller may proceed to the
/// persistence layer; a denial means it must not reach it.
pub fn authorize_mutation(identity: &Identity, mutation: &Mutation<'_>) -> Result<(), Denial> {
    match mutation {
        Mutation::CreateRecord(_) | Mutation::UpdateRecord(_) => {
            if identity.role.is_record_manager() {
                Ok(())
            } else {
                Err(Denial::forbidden("only managers may modify records"))
            }
        }
        Mutation::UpdateTask { task, patch } => {
            if identity.role.is_record_manager() {
                return Ok(());
            }
            if identity.role != Role::Technician {
                return Err(Denial::forbidden("only managers may modify records"));
            }
            if task.assigned_to_user_id != Some(identity.user_id) {
                return Err(Denial::forbidden("task is not assigned to you"));
            }
            if patch.touches_details() {
                return Err(Denial::forbidden("only managers can edit task details"));
            }
            Ok(())
        }
        Mutation::DeleteCustomer { .. } => {
            // Stricter than the general record-manager rule: project
            // managers may not delete or anonymize customers.
            if identity.role == Role::Admin {
                Ok(())
            } else {
                Err(Denial::forbidden("only admins may remove customers"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task_assigned_to(user_id: Option<Uuid>) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            assigned_to_user_id: user_id,
            title: "Replace hoist ropes".to_string(),
            description: None,
            status: TaskStatus::Pending,
            scheduled_for: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn status_patch() -> TaskPatch {
        TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        }
    }

    #[test]
    fn managers_create_and_update_records() {
        for role in [Role::Admin, Role::ProjectManager] {
            let identity = Identity::staff(Uuid::new_v4(), role);
            for kind in [
                RecordKind::Customer,
                RecordKind::Building,
                RecordKind::Project,
                RecordKind::Document,
            ] {
                assert!(authorize_mutation(&identity, &Mutation::CreateRecord(kind)).is_ok());
                assert!(authorize_mutation(&identity, &Mutation::UpdateRecord(kind)).is_ok());
            }
        }
    }

    #[test]
    fn non_managers_cannot_create_records() {
        for identity in [
            Identity::staff(Uuid::new_v4(), Role::Technician),
            Identity::customer(Uuid::new_v4(), Uuid::new_v4()),
        ] {
            let denial =
                authorize_mutation(&identity, &Mutation::CreateRecord(RecordKind::Project))
                    .unwrap_err();
            assert!(denial.is_forbidden());
        }
    }

    #[test]
    fn technician_may_change_status_on_own_task() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Technician);
        let task = task_assigned_to(Some(identity.user_id));
        let patch = status_patch();
        assert!(authorize_mutation(&identity, &Mutation::UpdateTask { task: &task, patch: &patch })
            .is_ok());
    }

    #[test]
    fn technician_may_not_change_title_on_own_task() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Technician);
        let task = task_assigned_to(Some(identity.user_id));
        let patch = TaskPatch {
            title: Some("New title".to_string()),
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        let denial =
            authorize_mutation(&identity, &Mutation::UpdateTask { task: &task, patch: &patch })
                .unwrap_err();
        assert!(denial.is_forbidden());
    }

    #[test]
    fn technician_may_not_touch_someone_elses_task() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Technician);
        let task = task_assigned_to(Some(Uuid::new_v4()));
        let patch = status_patch();
        assert!(authorize_mutation(&identity, &Mutation::UpdateTask { task: &task, patch: &patch })
            .is_err());

        let unassigned = task_assigned_to(None);
        assert!(authorize_mutation(
            &identity,
            &Mutation::UpdateTask {
                task: &unassigned,
                patch: &patch
            }
        )
        .is_err());
    }

    #[test]
    fn managers_update_any_task_field() {
        let identity = Identity::staff(Uuid::new_v4(), Role::ProjectManager);
        let task = task_assigned_to(None);
        let patch = TaskPatch {
            title: Some("Rescoped".to_string()),
            assigned_to_user_id: Some(Uuid::new_v4()),
            ..TaskPatch::default()
        };
        assert!(authorize_mutation(&identity, &Mutation::UpdateTask { task: &task, patch: &patch })
            .is_ok());
    }

    #[test]
    fn only_admin_removes_customers() {
        for anonymize in [false, true] {
            let admin = Identity::staff(Uuid::new_v4(), Role::Admin);
            assert!(
                authorize_mutation(&admin, &Mutation::DeleteCustomer { anonymize }).is_ok()
            );

            let pm = Identity::staff(Uuid::new_v4(), Role::ProjectManager);
            let denial =
                authorize_mutation(&pm, &Mutation::DeleteCustomer { anonymize }).unwrap_err();
            assert!(denial.is_forbidden());
        }
    }

    #[test]
    fn patch_detail_detection() {
        assert!(!status_patch().touches_details());
        assert!(TaskPatch {
            description: Some("x".into()),
            ..TaskPatch::default()
        }
        .touches_details());
        assert!(TaskPatch::default().is_empty());
    }
}
