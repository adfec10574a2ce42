//! # Project Model
//!
//! A project belongs to exactly one customer and one building, and owns
//! tasks and documents. Status moves through the inquiry→completed
//! pipeline; budget figures are whole currency units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::constants::{ProjectStatus, ProjectType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub building_id: Uuid,
    pub name: String,
    pub project_type: ProjectType,
    pub status: ProjectStatus,
    pub budget: Option<i64>,
    pub actual_cost: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New project for creation (without generated fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProject {
    pub customer_id: Uuid,
    pub building_id: Uuid,
    pub name: String,
    pub project_type: ProjectType,
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
    pub budget: Option<i64>,
    pub actual_cost: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Inquiry
}

impl Project {
    pub async fn create(pool: &PgPool, new_project: NewProject) -> Result<Project, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            r"
            INSERT INTO projects (id, customer_id, building_id, name, project_type, status,
                                  budget, actual_cost, start_date, end_date, description,
                                  created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW(), NOW())
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(new_project.customer_id)
        .bind(new_project.building_id)
        .bind(new_project.name)
        .bind(new_project.project_type)
        .bind(new_project.status)
        .bind(new_project.budget)
        .bind(new_project.actual_cost)
        .bind(new_project.start_date)
        .bind(new_project.end_date)
        .bind(new_project.description)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_status(
        pool: &PgPool,
        id: Uuid,
        status: ProjectStatus,
    ) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            "UPDATE projects SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }
}
