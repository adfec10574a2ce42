//! # Data Layer
//!
//! sqlx-backed models for every persisted entity. Each model is a `FromRow`
//! struct with a `New*` creation type and runtime-API CRUD taking a
//! `&PgPool`. Scoped reads live in [`crate::scopes`]; the models only carry
//! direct-by-id operations and writes, and none of them make authorization
//! decisions: callers go through the session guard and the mutation
//! authorizer first.

pub mod audit_log;
pub mod building;
pub mod customer;
pub mod document;
pub mod project;
pub mod task;
pub mod user;

pub use audit_log::{AuditLog, NewAuditLog};
pub use building::{Building, NewBuilding};
pub use customer::{Customer, CustomerPatch, NewCustomer};
pub use document::{Document, NewDocument};
pub use project::{NewProject, Project};
pub use task::{NewTask, Task};
pub use user::{NewUser, User};
