//! Project endpoints: scoped listing and detail, creation, status moves.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::audit::AuditEvent;
use crate::auth::Identity;
use crate::authorization::{authorize_mutation, Mutation, RecordKind};
use crate::constants::{audit, ProjectStatus, DEFAULT_LIST_LIMIT};
use crate::models::{Document, NewProject, Project, Task};
use crate::scopes::ScopeBuilder;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub customer_id: Option<Uuid>,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut scope = Project::scope()
        .visible_to(&identity)
        .limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT));
    if let Some(customer_id) = params.customer_id {
        scope = scope.for_customer(customer_id);
    }
    let projects = scope.all(&state.pool).await?;
    Ok(Json(serde_json::json!({ "items": projects })))
}

pub async fn get_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let project = Project::scope()
        .visible_to(&identity)
        .with_id(id)
        .first(&state.pool)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Related collections reuse the caller's scope rather than trusting
    // the parent lookup alone.
    let tasks = Task::scope()
        .visible_to(&identity)
        .for_project(project.id)
        .all(&state.pool)
        .await?;
    let documents = Document::for_project(&state.pool, project.id).await?;

    Ok(Json(serde_json::json!({
        "project": project,
        "tasks": tasks,
        "documents": documents,
    })))
}

pub async fn create_project(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(new_project): Json<NewProject>,
) -> Result<(axum::http::StatusCode, Json<Project>), ApiError> {
    authorize_mutation(&identity, &Mutation::CreateRecord(RecordKind::Project))?;

    let project = Project::create(&state.pool, new_project).await?;

    state
        .audit
        .record(AuditEvent::new(
            identity.user_id,
            audit::PROJECT_CREATE,
            "project",
            project.id,
        ))
        .await;

    Ok((axum::http::StatusCode::CREATED, Json(project)))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: ProjectStatus,
}

pub async fn set_project_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Project>, ApiError> {
    authorize_mutation(&identity, &Mutation::UpdateRecord(RecordKind::Project))?;

    let project = Project::set_status(&state.pool, id, body.status)
        .await?
        .ok_or(ApiError::NotFound)?;

    state
        .audit
        .record(
            AuditEvent::new(identity.user_id, audit::PROJECT_UPDATE, "project", project.id)
                .with_metadata(serde_json::json!({ "status": body.status })),
        )
        .await;

    Ok(Json(project))
}
