//! In-memory interpretation of visibility filters.
//!
//! The interpreter mirrors the SQL adapter's semantics exactly: equality on
//! the entity's own columns, `Exists` across the customer→projects→tasks
//! relations, `All`/`Never` as match-everything/match-nothing. A field or
//! relation that does not apply to the entity evaluates to false, the same
//! fail-closed rendering the SQL adapter uses. The store also carries the
//! customer soft-delete write with the data layer's idempotent semantics,
//! so the full authorize-then-write pipeline is testable in memory.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::scopes::{FilterField, FilterValue, Relation, VisibilityFilter};

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerRow {
    pub id: Uuid,
    pub is_deleted: bool,
    pub anonymized_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRow {
    pub id: Uuid,
    pub customer_id: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub assigned_to_user_id: Option<Uuid>,
}

/// Entity rows plus filter evaluation over them.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub customers: Vec<CustomerRow>,
    pub projects: Vec<ProjectRow>,
    pub tasks: Vec<TaskRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_customer(&mut self, id: Uuid, is_deleted: bool) -> Uuid {
        self.customers.push(CustomerRow {
            id,
            is_deleted,
            anonymized_at: None,
        });
        id
    }

    /// Soft delete a customer, optionally refreshing the anonymization
    /// timestamp. Mirrors the SQL model: idempotent, so repeating it on an
    /// already-deleted row succeeds and returns the row again.
    pub fn soft_delete_customer(&mut self, id: Uuid, anonymize: bool) -> Option<CustomerRow> {
        let row = self.customers.iter_mut().find(|c| c.id == id)?;
        row.is_deleted = true;
        row.anonymized_at = anonymize.then(Utc::now);
        Some(row.clone())
    }

    pub fn add_project(&mut self, id: Uuid, customer_id: Uuid) -> Uuid {
        self.projects.push(ProjectRow { id, customer_id });
        id
    }

    pub fn add_task(&mut self, id: Uuid, project_id: Uuid, assigned_to: Option<Uuid>) -> Uuid {
        self.tasks.push(TaskRow {
            id,
            project_id,
            assigned_to_user_id: assigned_to,
        });
        id
    }

    /// Ids of customers matching the filter.
    pub fn find_customers(&self, filter: &VisibilityFilter) -> Vec<Uuid> {
        self.customers
            .iter()
            .filter(|row| self.customer_matches(row, filter))
            .map(|row| row.id)
            .collect()
    }

    /// Ids of projects matching the filter.
    pub fn find_projects(&self, filter: &VisibilityFilter) -> Vec<Uuid> {
        self.projects
            .iter()
            .filter(|row| self.project_matches(row, filter))
            .map(|row| row.id)
            .collect()
    }

    /// Ids of tasks matching the filter.
    pub fn find_tasks(&self, filter: &VisibilityFilter) -> Vec<Uuid> {
        self.tasks
            .iter()
            .filter(|row| self.task_matches(row, filter))
            .map(|row| row.id)
            .collect()
    }

    pub fn count_projects(&self, filter: &VisibilityFilter) -> usize {
        self.find_projects(filter).len()
    }

    fn customer_matches(&self, row: &CustomerRow, filter: &VisibilityFilter) -> bool {
        match filter {
            VisibilityFilter::All => true,
            VisibilityFilter::Never => false,
            VisibilityFilter::Equals { field, value } => match (field, value) {
                (FilterField::Id, FilterValue::Uuid(v)) => row.id == *v,
                (FilterField::IsDeleted, FilterValue::Bool(v)) => row.is_deleted == *v,
                _ => false,
            },
            VisibilityFilter::Exists { relation, filter } => match relation {
                Relation::Projects => self
                    .projects
                    .iter()
                    .any(|p| p.customer_id == row.id && self.project_matches(p, filter)),
                _ => false,
            },
            VisibilityFilter::And(filters) => {
                filters.iter().all(|f| self.customer_matches(row, f))
            }
        }
    }

    fn project_matches(&self, row: &ProjectRow, filter: &VisibilityFilter) -> bool {
        match filter {
            VisibilityFilter::All => true,
            VisibilityFilter::Never => false,
            VisibilityFilter::Equals { field, value } => match (field, value) {
                (FilterField::Id, FilterValue::Uuid(v)) => row.id == *v,
                (FilterField::CustomerId, FilterValue::Uuid(v)) => row.customer_id == *v,
                _ => false,
            },
            VisibilityFilter::Exists { relation, filter } => match relation {
                Relation::Tasks => self
                    .tasks
                    .iter()
                    .any(|t| t.project_id == row.id && self.task_matches(t, filter)),
                _ => false,
            },
            VisibilityFilter::And(filters) => filters.iter().all(|f| self.project_matches(row, f)),
        }
    }

    fn task_matches(&self, row: &TaskRow, filter: &VisibilityFilter) -> bool {
        match filter {
            VisibilityFilter::All => true,
            VisibilityFilter::Never => false,
            VisibilityFilter::Equals { field, value } => match (field, value) {
                (FilterField::Id, FilterValue::Uuid(v)) => row.id == *v,
                (FilterField::AssignedToUserId, FilterValue::Uuid(v)) => {
                    row.assigned_to_user_id == Some(*v)
                }
                _ => false,
            },
            VisibilityFilter::Exists { relation, filter } => match relation {
                Relation::Project => self
                    .projects
                    .iter()
                    .any(|p| p.id == row.project_id && self.project_matches(p, filter)),
                _ => false,
            },
            VisibilityFilter::And(filters) => filters.iter().all(|f| self.task_matches(row, f)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_never_behave() {
        let mut store = MemoryStore::new();
        store.add_customer(Uuid::new_v4(), false);
        store.add_customer(Uuid::new_v4(), true);

        assert_eq!(store.find_customers(&VisibilityFilter::All).len(), 2);
        assert!(store.find_customers(&VisibilityFilter::Never).is_empty());
    }

    #[test]
    fn exists_traverses_relations() {
        let mut store = MemoryStore::new();
        let technician = Uuid::new_v4();
        let customer = store.add_customer(Uuid::new_v4(), false);
        let other_customer = store.add_customer(Uuid::new_v4(), false);
        let project = store.add_project(Uuid::new_v4(), customer);
        store.add_project(Uuid::new_v4(), other_customer);
        store.add_task(Uuid::new_v4(), project, Some(technician));

        let filter = VisibilityFilter::exists(
            Relation::Projects,
            VisibilityFilter::exists(
                Relation::Tasks,
                VisibilityFilter::equals(FilterField::AssignedToUserId, technician),
            ),
        );
        assert_eq!(store.find_customers(&filter), vec![customer]);
    }

    #[test]
    fn soft_delete_is_idempotent_and_refreshes_anonymization() {
        let mut store = MemoryStore::new();
        let id = store.add_customer(Uuid::new_v4(), false);

        let first = store.soft_delete_customer(id, true).unwrap();
        assert!(first.is_deleted);
        let first_at = first.anonymized_at.unwrap();

        let second = store.soft_delete_customer(id, true).unwrap();
        assert!(second.is_deleted);
        assert!(second.anonymized_at.unwrap() >= first_at);

        assert!(store.soft_delete_customer(Uuid::new_v4(), true).is_none());
    }

    #[test]
    fn mismatched_fields_evaluate_false() {
        let mut store = MemoryStore::new();
        store.add_customer(Uuid::new_v4(), false);
        // AssignedToUserId is not a customer column; must match nothing.
        let filter = VisibilityFilter::equals(FilterField::AssignedToUserId, Uuid::new_v4());
        assert!(store.find_customers(&filter).is_empty());
    }
}
