//! # Visibility Filter AST
//!
//! An ownership-neutral, composable predicate over entity rows. Resolvers
//! construct these; they never evaluate them. Adapters translate a filter
//! into their own query form: [`super::sql`] renders parameter-bound SQL,
//! and the in-memory store in [`crate::test_helpers`] interprets filters
//! directly for tests.
//!
//! Keeping the predicate abstract means the same authorization decision
//! composes with listing, counting, pagination, and detail lookups without
//! the policy being restated per query shape.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A column an equality condition may reference. Closed set: filters can
/// only name columns the authorization layer actually scopes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    Id,
    IsDeleted,
    CustomerId,
    AssignedToUserId,
}

impl FilterField {
    pub fn column(&self) -> &'static str {
        match self {
            FilterField::Id => "id",
            FilterField::IsDeleted => "is_deleted",
            FilterField::CustomerId => "customer_id",
            FilterField::AssignedToUserId => "assigned_to_user_id",
        }
    }
}

/// A bindable comparison value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Uuid(Uuid),
    Bool(bool),
}

/// A relation an `Exists` condition traverses, from the entity being
/// filtered to a related collection (or parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Customer -> its projects.
    Projects,
    /// Project -> its tasks.
    Tasks,
    /// Task -> its parent project.
    Project,
}

/// The visibility predicate itself.
///
/// `All` matches every row, `Never` matches none. `Never` is the mandated
/// fail-closed shape for malformed identities: a filter that cannot be
/// satisfied, not an error that aborts the request and not an
/// equality-with-empty-value coincidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityFilter {
    All,
    Never,
    Equals {
        field: FilterField,
        value: FilterValue,
    },
    Exists {
        relation: Relation,
        filter: Box<VisibilityFilter>,
    },
    And(Vec<VisibilityFilter>),
}

impl VisibilityFilter {
    pub fn equals(field: FilterField, value: impl Into<FilterValue>) -> Self {
        VisibilityFilter::Equals {
            field,
            value: value.into(),
        }
    }

    pub fn exists(relation: Relation, filter: VisibilityFilter) -> Self {
        VisibilityFilter::Exists {
            relation,
            filter: Box::new(filter),
        }
    }

    /// Conjunction with short-circuit normalization: `All` is the identity,
    /// `Never` is absorbing, nested `And`s flatten, and duplicate conditions
    /// collapse, so `f.and(f) == f`.
    pub fn and(self, other: VisibilityFilter) -> Self {
        match (self, other) {
            (VisibilityFilter::Never, _) | (_, VisibilityFilter::Never) => VisibilityFilter::Never,
            (VisibilityFilter::All, f) | (f, VisibilityFilter::All) => f,
            (VisibilityFilter::And(mut left), VisibilityFilter::And(right)) => {
                for f in right {
                    if !left.contains(&f) {
                        left.push(f);
                    }
                }
                VisibilityFilter::And(left)
            }
            (VisibilityFilter::And(mut left), f) => {
                if !left.contains(&f) {
                    left.push(f);
                }
                VisibilityFilter::And(left)
            }
            (f, VisibilityFilter::And(right)) => {
                if right.contains(&f) {
                    VisibilityFilter::And(right)
                } else {
                    let mut filters = Vec::with_capacity(right.len() + 1);
                    filters.push(f);
                    filters.extend(right);
                    VisibilityFilter::And(filters)
                }
            }
            (a, b) => {
                if a == b {
                    a
                } else {
                    VisibilityFilter::And(vec![a, b])
                }
            }
        }
    }

    pub fn is_never(&self) -> bool {
        matches!(self, VisibilityFilter::Never)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, VisibilityFilter::All)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Uuid(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}
