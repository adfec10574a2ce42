#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # LiftOps Core
//!
//! Backend core for the LiftOps elevator installation and modernization CRM:
//! customers, buildings, projects, work-order tasks, documents, and the
//! role-scoped data-access layer that gates all of them.
//!
//! ## Architecture
//!
//! Every request funnels through the same pipeline:
//!
//! 1. [`auth::SessionGuard`] resolves the caller [`auth::Identity`] from a
//!    bearer token and enforces endpoint role allow-lists.
//! 2. [`scopes`] converts the identity into a [`scopes::VisibilityFilter`],
//!    a declarative predicate the persistence adapters translate into SQL
//!    (or that test doubles interpret in memory). Resolvers never fetch
//!    data themselves, so the same filter composes with listing, counting,
//!    and detail lookups without duplicating policy.
//! 3. [`authorization`] applies per-mutation checks that go beyond row
//!    visibility (record-manager gating, technician status-only task
//!    patches, admin-only customer removal).
//! 4. [`audit`] records the outcome, best-effort, never affecting the
//!    decision.
//!
//! The guard and the authorizer return denial *values* ([`error::Denial`]),
//! not errors, so the web adapter can map them straight onto 401/403
//! responses.
//!
//! ## Module Organization
//!
//! - [`constants`] - Closed role/status enums and audit action names
//! - [`error`] - Structured error taxonomy and the denial type
//! - [`config`] - Layered TOML + environment configuration
//! - [`models`] - Data layer for all persisted entities
//! - [`scopes`] - Visibility filter AST, per-role resolvers, SQL scopes
//! - [`auth`] - Role model, identity, session guard, tokens, passwords
//! - [`authorization`] - Mutation authorizer
//! - [`audit`] - Audit sink trait and implementations
//! - [`storage`] - Blob store trait and local filesystem implementation
//! - [`web`] - Thin axum adapter (middleware, handlers, router)
//!
//! ## Quick Start
//!
//! ```rust
//! use liftops_core::auth::{Identity, Role};
//! use liftops_core::scopes::project_visibility;
//! use uuid::Uuid;
//!
//! let caller = Identity::customer(Uuid::new_v4(), Uuid::new_v4());
//! // A declarative predicate; hand it to a store adapter to run the query.
//! let filter = project_visibility(&caller);
//! assert!(!filter.is_never());
//! ```

pub mod audit;
pub mod auth;
pub mod authorization;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod scopes;
pub mod storage;
pub mod test_helpers;
pub mod web;

pub use auth::{Identity, Role, SessionGuard, TokenVerifier};
pub use authorization::{authorize_mutation, Mutation, RecordKind, TaskPatch};
pub use constants::{DocumentType, ProjectStatus, ProjectType, TaskStatus};
pub use error::{Denial, DenialKind, LiftopsError, Result};
pub use scopes::{
    customer_visibility, project_visibility, task_visibility, VisibilityFilter,
};
