//! # SQL Scope Builders
//!
//! Chainable, composable query scopes for the scoped entity collections,
//! translating [`VisibilityFilter`]s into parameter-bound SQL. The builders
//! are declarative: conditions accumulate on the scope value and the actual
//! `QueryBuilder` is assembled per execution shape (`all`, `first`,
//! `count`, `exists`), so the same scope serves listing, counting, and
//! detail lookups.
//!
//! All comparison values go through `push_bind`; no caller-supplied value
//! is ever interpolated into SQL text. `VisibilityFilter::Never` renders as
//! `FALSE`, which keeps the fail-closed guarantee intact at the SQL layer.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::error;
use uuid::Uuid;

use super::filter::{FilterValue, Relation, VisibilityFilter};
use super::resolver::{customer_visibility, project_visibility, task_visibility};
use crate::auth::Identity;
use crate::constants::{TaskStatus, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use crate::models::{Customer, Project, Task};

/// Standard execution methods shared by every scope builder.
#[async_trait]
pub trait ScopeBuilder: Sized + Send {
    type Model: Send + Unpin;

    /// Fetch all rows matching the scope.
    async fn all(self, pool: &PgPool) -> Result<Vec<Self::Model>, sqlx::Error>;

    /// Fetch the first matching row, if any.
    async fn first(self, pool: &PgPool) -> Result<Option<Self::Model>, sqlx::Error>;

    /// Count matching rows.
    async fn count(self, pool: &PgPool) -> Result<i64, sqlx::Error>;

    /// True if at least one row matches.
    async fn exists(self, pool: &PgPool) -> Result<bool, sqlx::Error> {
        Ok(self.count(pool).await? > 0)
    }
}

/// Tables the filter AST can be rendered against. The table determines how
/// each [`Relation`] joins to its related collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeTable {
    Customers,
    Projects,
    Tasks,
}

impl ScopeTable {
    fn name(self) -> &'static str {
        match self {
            ScopeTable::Customers => "customers",
            ScopeTable::Projects => "projects",
            ScopeTable::Tasks => "tasks",
        }
    }
}

/// Render a visibility filter as a SQL condition on `table`, binding every
/// comparison value.
///
/// A relation that does not apply to the table (a resolver bug) renders as
/// `FALSE`: fail closed, report, never widen.
fn push_filter(
    query: &mut QueryBuilder<'static, Postgres>,
    table: ScopeTable,
    filter: &VisibilityFilter,
) {
    match filter {
        VisibilityFilter::All => {
            query.push("TRUE");
        }
        VisibilityFilter::Never => {
            query.push("FALSE");
        }
        VisibilityFilter::Equals { field, value } => {
            query.push(format!("{}.{} = ", table.name(), field.column()));
            match value {
                FilterValue::Uuid(v) => query.push_bind(*v),
                FilterValue::Bool(v) => query.push_bind(*v),
            };
        }
        VisibilityFilter::Exists { relation, filter } => {
            let link = match (table, relation) {
                (ScopeTable::Customers, Relation::Projects) => Some((
                    ScopeTable::Projects,
                    "projects.customer_id = customers.id",
                )),
                (ScopeTable::Projects, Relation::Tasks) => {
                    Some((ScopeTable::Tasks, "tasks.project_id = projects.id"))
                }
                (ScopeTable::Tasks, Relation::Project) => {
                    Some((ScopeTable::Projects, "projects.id = tasks.project_id"))
                }
                _ => None,
            };
            match link {
                Some((related, join)) => {
                    query.push(format!(
                        "EXISTS (SELECT 1 FROM {} WHERE {} AND ",
                        related.name(),
                        join
                    ));
                    push_filter(query, related, filter);
                    query.push(")");
                }
                None => {
                    error!(
                        table = table.name(),
                        ?relation,
                        "filter relation does not apply to table; rendering FALSE"
                    );
                    query.push("FALSE");
                }
            }
        }
        VisibilityFilter::And(filters) => {
            query.push("(");
            for (i, sub) in filters.iter().enumerate() {
                if i > 0 {
                    query.push(" AND ");
                }
                push_filter(query, table, sub);
            }
            query.push(")");
        }
    }
}

fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LIST_LIMIT)
}

/// Scoped queries over customers.
pub struct CustomerScope {
    filter: VisibilityFilter,
    include_deleted: bool,
    limit: Option<i64>,
}

impl Customer {
    /// Start building a scoped query. Soft-deleted customers are excluded
    /// by default; [`CustomerScope::including_deleted`] is the explicit
    /// privileged path around that.
    pub fn scope() -> CustomerScope {
        CustomerScope {
            filter: VisibilityFilter::All,
            include_deleted: false,
            limit: None,
        }
    }
}

impl CustomerScope {
    /// Conjoin the caller's visibility filter (which encodes the deletion
    /// policy per role). Conditions only accumulate; call order cannot
    /// weaken a scope.
    pub fn visible_to(mut self, identity: &Identity) -> Self {
        self.filter = self.filter.and(customer_visibility(identity));
        self
    }

    /// Drop the baseline deleted-rows exclusion. Callers must gate this
    /// behind an admin check. Filters already applied by `visible_to` or
    /// `with_id` stay in force.
    pub fn including_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// Restrict to a single customer id.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.filter = self
            .filter
            .and(VisibilityFilter::equals(super::filter::FilterField::Id, id));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(clamp_limit(limit));
        self
    }

    fn build(&self, select: &str) -> QueryBuilder<'static, Postgres> {
        let filter = if self.include_deleted {
            self.filter.clone()
        } else {
            VisibilityFilter::equals(super::filter::FilterField::IsDeleted, false)
                .and(self.filter.clone())
        };
        let mut query = QueryBuilder::new(format!("{select} FROM customers WHERE "));
        push_filter(&mut query, ScopeTable::Customers, &filter);
        query
    }

    /// Rendered SQL for the listing shape, used by tests to assert on the
    /// generated query without a live database.
    pub fn to_sql(&self) -> String {
        self.build("SELECT customers.*").sql().to_string()
    }
}

#[async_trait]
impl ScopeBuilder for CustomerScope {
    type Model = Customer;

    async fn all(self, pool: &PgPool) -> Result<Vec<Customer>, sqlx::Error> {
        let mut query = self.build("SELECT customers.*");
        query.push(" ORDER BY customers.name ASC");
        query.push(" LIMIT ");
        query.push_bind(self.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        query.build_query_as::<Customer>().fetch_all(pool).await
    }

    async fn first(self, pool: &PgPool) -> Result<Option<Customer>, sqlx::Error> {
        let mut query = self.build("SELECT customers.*");
        query.push(" LIMIT 1");
        query.build_query_as::<Customer>().fetch_optional(pool).await
    }

    async fn count(self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        self.build("SELECT COUNT(*)")
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
    }
}

/// Scoped queries over projects.
pub struct ProjectScope {
    filter: VisibilityFilter,
    customer_id: Option<Uuid>,
    limit: Option<i64>,
}

impl Project {
    pub fn scope() -> ProjectScope {
        ProjectScope {
            filter: VisibilityFilter::All,
            customer_id: None,
            limit: None,
        }
    }
}

impl ProjectScope {
    pub fn visible_to(mut self, identity: &Identity) -> Self {
        self.filter = self.filter.and(project_visibility(identity));
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.filter = self
            .filter
            .and(VisibilityFilter::equals(super::filter::FilterField::Id, id));
        self
    }

    pub fn for_customer(mut self, customer_id: Uuid) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(clamp_limit(limit));
        self
    }

    fn build(&self, select: &str) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(format!("{select} FROM projects WHERE "));
        push_filter(&mut query, ScopeTable::Projects, &self.filter);
        if let Some(customer_id) = self.customer_id {
            query.push(" AND projects.customer_id = ");
            query.push_bind(customer_id);
        }
        query
    }

    pub fn to_sql(&self) -> String {
        self.build("SELECT projects.*").sql().to_string()
    }
}

#[async_trait]
impl ScopeBuilder for ProjectScope {
    type Model = Project;

    async fn all(self, pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let mut query = self.build("SELECT projects.*");
        query.push(" ORDER BY projects.created_at DESC");
        query.push(" LIMIT ");
        query.push_bind(self.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        query.build_query_as::<Project>().fetch_all(pool).await
    }

    async fn first(self, pool: &PgPool) -> Result<Option<Project>, sqlx::Error> {
        let mut query = self.build("SELECT projects.*");
        query.push(" LIMIT 1");
        query.build_query_as::<Project>().fetch_optional(pool).await
    }

    async fn count(self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        self.build("SELECT COUNT(*)")
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
    }
}

/// Scoped queries over tasks.
pub struct TaskScope {
    filter: VisibilityFilter,
    project_id: Option<Uuid>,
    status: Option<TaskStatus>,
    assigned_to: Option<Uuid>,
    limit: Option<i64>,
}

impl Task {
    pub fn scope() -> TaskScope {
        TaskScope {
            filter: VisibilityFilter::All,
            project_id: None,
            status: None,
            assigned_to: None,
            limit: None,
        }
    }
}

impl TaskScope {
    pub fn visible_to(mut self, identity: &Identity) -> Self {
        self.filter = self.filter.and(task_visibility(identity));
        self
    }

    pub fn with_id(mut self, id: Uuid) -> Self {
        self.filter = self
            .filter
            .and(VisibilityFilter::equals(super::filter::FilterField::Id, id));
        self
    }

    pub fn for_project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn assigned_to(mut self, user_id: Uuid) -> Self {
        self.assigned_to = Some(user_id);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(clamp_limit(limit));
        self
    }

    fn build(&self, select: &str) -> QueryBuilder<'static, Postgres> {
        let mut query = QueryBuilder::new(format!("{select} FROM tasks WHERE "));
        push_filter(&mut query, ScopeTable::Tasks, &self.filter);
        if let Some(project_id) = self.project_id {
            query.push(" AND tasks.project_id = ");
            query.push_bind(project_id);
        }
        if let Some(status) = self.status {
            query.push(" AND tasks.status = ");
            query.push_bind(status);
        }
        if let Some(user_id) = self.assigned_to {
            query.push(" AND tasks.assigned_to_user_id = ");
            query.push_bind(user_id);
        }
        query
    }

    pub fn to_sql(&self) -> String {
        self.build("SELECT tasks.*").sql().to_string()
    }
}

#[async_trait]
impl ScopeBuilder for TaskScope {
    type Model = Task;

    async fn all(self, pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
        let mut query = self.build("SELECT tasks.*");
        query.push(" ORDER BY tasks.scheduled_for ASC NULLS LAST, tasks.created_at DESC");
        query.push(" LIMIT ");
        query.push_bind(self.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        query.build_query_as::<Task>().fetch_all(pool).await
    }

    async fn first(self, pool: &PgPool) -> Result<Option<Task>, sqlx::Error> {
        let mut query = self.build("SELECT tasks.*");
        query.push(" LIMIT 1");
        query.build_query_as::<Task>().fetch_optional(pool).await
    }

    async fn count(self, pool: &PgPool) -> Result<i64, sqlx::Error> {
        self.build("SELECT COUNT(*)")
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Role;

    #[test]
    fn manager_task_scope_renders_match_all() {
        let identity = Identity::staff(Uuid::new_v4(), Role::ProjectManager);
        let sql = Task::scope().visible_to(&identity).to_sql();
        assert_eq!(sql, "SELECT tasks.* FROM tasks WHERE TRUE");
    }

    #[test]
    fn technician_task_scope_binds_assignment() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Technician);
        let sql = Task::scope().visible_to(&identity).to_sql();
        assert!(sql.contains("tasks.assigned_to_user_id = $1"), "{sql}");
    }

    #[test]
    fn customer_task_scope_uses_exists_subquery() {
        let identity = Identity::customer(Uuid::new_v4(), Uuid::new_v4());
        let sql = Task::scope().visible_to(&identity).to_sql();
        assert!(
            sql.contains(
                "EXISTS (SELECT 1 FROM projects WHERE projects.id = tasks.project_id AND projects.customer_id = $1)"
            ),
            "{sql}"
        );
    }

    #[test]
    fn technician_customer_scope_nests_exists() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Technician);
        let sql = Customer::scope().visible_to(&identity).to_sql();
        assert!(sql.contains("EXISTS (SELECT 1 FROM projects WHERE projects.customer_id = customers.id AND EXISTS (SELECT 1 FROM tasks WHERE tasks.project_id = projects.id AND tasks.assigned_to_user_id = $1))"), "{sql}");
        assert!(sql.contains("customers.is_deleted = $2"), "{sql}");
    }

    #[test]
    fn malformed_identity_renders_false() {
        let identity = Identity {
            user_id: Uuid::new_v4(),
            role: Role::Customer,
            customer_id: None,
        };
        let sql = Project::scope().visible_to(&identity).to_sql();
        assert_eq!(sql, "SELECT projects.* FROM projects WHERE FALSE");
    }

    #[test]
    fn default_customer_scope_excludes_deleted() {
        let sql = Customer::scope().to_sql();
        assert!(sql.contains("customers.is_deleted = $1"), "{sql}");
    }

    #[test]
    fn including_deleted_drops_the_exclusion() {
        let sql = Customer::scope().including_deleted().to_sql();
        assert_eq!(sql, "SELECT customers.* FROM customers WHERE TRUE");
    }

    #[test]
    fn customer_id_pin_survives_a_later_visible_to() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Admin);
        let sql = Customer::scope()
            .with_id(Uuid::new_v4())
            .visible_to(&identity)
            .to_sql();
        assert!(sql.contains("customers.id = $1"), "{sql}");
        assert!(sql.contains("customers.is_deleted = $2"), "{sql}");
    }

    #[test]
    fn including_deleted_keeps_role_filters_in_force() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Technician);
        let sql = Customer::scope()
            .visible_to(&identity)
            .including_deleted()
            .to_sql();
        assert!(sql.contains("EXISTS (SELECT 1 FROM projects"), "{sql}");
        assert!(sql.contains("tasks.assigned_to_user_id = $1"), "{sql}");
    }

    #[test]
    fn chained_task_scopes_bind_in_order() {
        let identity = Identity::staff(Uuid::new_v4(), Role::Technician);
        let sql = Task::scope()
            .visible_to(&identity)
            .for_project(Uuid::new_v4())
            .with_status(TaskStatus::InProgress)
            .to_sql();
        assert!(sql.contains("tasks.assigned_to_user_id = $1"), "{sql}");
        assert!(sql.contains("tasks.project_id = $2"), "{sql}");
        assert!(sql.contains("tasks.status = $3"), "{sql}");
    }
}
