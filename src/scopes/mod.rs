//! # Visibility Scopes
//!
//! The role-scoped data-access layer. Three pieces:
//!
//! - [`filter`]: the ownership-neutral [`VisibilityFilter`] predicate AST.
//! - [`resolver`]: pure functions from a caller identity to the filter that
//!   scopes each entity collection.
//! - [`sql`]: chainable scope builders that translate filters into
//!   parameter-bound SQL with `all`/`first`/`count`/`exists` execution.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use liftops_core::auth::Identity;
//! use liftops_core::models::Task;
//! use liftops_core::scopes::ScopeBuilder;
//! # async fn example(pool: &sqlx::PgPool, identity: &Identity) -> Result<(), sqlx::Error> {
//! // Everything a technician is allowed to see, newest first.
//! let tasks = Task::scope().visible_to(identity).all(pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod filter;
pub mod resolver;
pub mod sql;

pub use filter::{FilterField, FilterValue, Relation, VisibilityFilter};
pub use resolver::{customer_visibility, project_visibility, task_visibility};
pub use sql::{CustomerScope, ProjectScope, ScopeBuilder, TaskScope};
