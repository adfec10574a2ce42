//! # Task Model
//!
//! Work-order tasks within a project, optionally assigned to a technician.
//! The mutation authorizer decides who may apply which parts of a
//! [`TaskPatch`]; the model just applies whatever patch it is handed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::authorization::TaskPatch;
use crate::constants::TaskStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub assigned_to_user_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New task for creation (without generated fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub project_id: Uuid,
    pub assigned_to_user_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: TaskStatus,
    pub scheduled_for: Option<DateTime<Utc>>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Pending
}

impl Task {
    pub async fn create(pool: &PgPool, new_task: NewTask) -> Result<Task, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r"
            INSERT INTO tasks (id, project_id, assigned_to_user_id, title, description, status,
                               scheduled_for, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(new_task.project_id)
        .bind(new_task.assigned_to_user_id)
        .bind(new_task.title)
        .bind(new_task.description)
        .bind(new_task.status)
        .bind(new_task.scheduled_for)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Task>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a partial update. Only the fields present in the patch are
    /// written; `updated_at` always is.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: &TaskPatch,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE tasks SET ");
        let mut fields = query.separated(", ");
        if let Some(title) = &patch.title {
            fields.push("title = ").push_bind_unseparated(title.clone());
        }
        if let Some(description) = &patch.description {
            fields
                .push("description = ")
                .push_bind_unseparated(description.clone());
        }
        if let Some(status) = patch.status {
            fields.push("status = ").push_bind_unseparated(status);
        }
        if let Some(scheduled_for) = patch.scheduled_for {
            fields
                .push("scheduled_for = ")
                .push_bind_unseparated(scheduled_for);
        }
        if let Some(assigned_to) = patch.assigned_to_user_id {
            fields
                .push("assigned_to_user_id = ")
                .push_bind_unseparated(assigned_to);
        }
        if let Some(project_id) = patch.project_id {
            fields
                .push("project_id = ")
                .push_bind_unseparated(project_id);
        }
        fields.push("updated_at = NOW()");

        query.push(" WHERE id = ");
        query.push_bind(id);
        query.push(" RETURNING *");

        query.build_query_as::<Task>().fetch_optional(pool).await
    }
}
