//! # System Constants
//!
//! Closed enums and action names that define the operational boundaries of
//! the LiftOps backend. The role and status sets mirror the production
//! database schema; anything outside them is a configuration or programming
//! error, not a value to be silently tolerated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LiftopsError;

/// Audit action names recorded by the audit sink.
///
/// Denied mutations may only ever produce [`audit::ACCESS_DENIED`]; the
/// `*.create` / `*.update` names are reserved for writes that actually
/// happened.
pub mod audit {
    pub const CUSTOMER_CREATE: &str = "customer.create";
    pub const CUSTOMER_UPDATE: &str = "customer.update";
    pub const CUSTOMER_SOFT_DELETE: &str = "customer.soft_delete";
    pub const CUSTOMER_ANONYMIZE: &str = "customer.anonymize";
    pub const PROJECT_CREATE: &str = "project.create";
    pub const PROJECT_UPDATE: &str = "project.update";
    pub const TASK_CREATE: &str = "task.create";
    pub const TASK_UPDATE: &str = "task.update";
    pub const DOCUMENT_UPLOAD: &str = "document.upload";
    pub const AUTH_REGISTER: &str = "auth.register";
    pub const ACCESS_DENIED: &str = "auth.access_denied";
}

/// Caller roles. A closed set: the session token boundary is the only
/// place role strings are parsed, and an unknown string fails there with
/// [`LiftopsError::InvalidState`] rather than leaking downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    ProjectManager,
    Technician,
    Customer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::ProjectManager,
        Role::Technician,
        Role::Customer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ProjectManager => "project_manager",
            Role::Technician => "technician",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = LiftopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "project_manager" => Ok(Role::ProjectManager),
            "technician" => Ok(Role::Technician),
            "customer" => Ok(Role::Customer),
            other => Err(LiftopsError::InvalidState(format!(
                "unknown role: {other}"
            ))),
        }
    }
}

/// Work-order task lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

/// Project lifecycle states, from first inquiry through final inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
pub enum ProjectStatus {
    Inquiry,
    Quoted,
    Approved,
    InProgress,
    Inspection,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Inquiry => "inquiry",
            ProjectStatus::Quoted => "quoted",
            ProjectStatus::Approved => "approved",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Inspection => "inspection",
            ProjectStatus::Completed => "completed",
        }
    }
}

/// Kinds of work the business takes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "project_type", rename_all = "snake_case")]
pub enum ProjectType {
    NewInstallation,
    Modernization,
    Repair,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::NewInstallation => "new_installation",
            ProjectType::Modernization => "modernization",
            ProjectType::Repair => "repair",
        }
    }
}

/// Document categories attached to projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
pub enum DocumentType {
    Blueprint,
    Permit,
    Contract,
    InspectionReport,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Blueprint => "blueprint",
            DocumentType::Permit => "permit",
            DocumentType::Contract => "contract",
            DocumentType::InspectionReport => "inspection_report",
        }
    }
}

impl FromStr for DocumentType {
    type Err = LiftopsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blueprint" => Ok(DocumentType::Blueprint),
            "permit" => Ok(DocumentType::Permit),
            "contract" => Ok(DocumentType::Contract),
            "inspection_report" => Ok(DocumentType::InspectionReport),
            other => Err(LiftopsError::Validation(format!(
                "invalid document type: {other}"
            ))),
        }
    }
}

/// Default page size for scoped listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Hard cap on page size, regardless of what the client asks for.
pub const MAX_LIST_LIMIT: i64 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_an_invalid_state() {
        let err = Role::from_str("superuser").unwrap_err();
        assert!(matches!(err, LiftopsError::InvalidState(_)));
    }

    #[test]
    fn role_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::ProjectManager).unwrap();
        assert_eq!(json, "\"project_manager\"");
        let back: Role = serde_json::from_str("\"technician\"").unwrap();
        assert_eq!(back, Role::Technician);
    }
}
