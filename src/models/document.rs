//! Documents attached to projects: blueprints, permits, contracts,
//! inspection reports. The file body lives in the blob store; rows here
//! only carry the returned URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::constants::DocumentType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub project_id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub url: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDocument {
    pub project_id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub url: String,
    pub uploaded_by: Uuid,
}

impl Document {
    pub async fn create(pool: &PgPool, new_document: NewDocument) -> Result<Document, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            r"
            INSERT INTO documents (id, project_id, document_type, file_name, url, uploaded_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(new_document.project_id)
        .bind(new_document.document_type)
        .bind(new_document.file_name)
        .bind(new_document.url)
        .bind(new_document.uploaded_by)
        .fetch_one(pool)
        .await
    }

    pub async fn for_project(
        pool: &PgPool,
        project_id: Uuid,
    ) -> Result<Vec<Document>, sqlx::Error> {
        sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
