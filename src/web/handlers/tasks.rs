//! Task endpoints: scoped listing, creation, and partial updates.
//!
//! The patch path is the subtle one: managers may change anything, a
//! technician only the status/schedule of a task assigned to them. The
//! mutation authorizer decides; a denial stops before the store is touched
//! and records only an access-denied audit entry.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::audit::AuditEvent;
use crate::auth::Identity;
use crate::authorization::{authorize_mutation, Mutation, RecordKind, TaskPatch};
use crate::constants::{audit, DEFAULT_LIST_LIMIT};
use crate::models::{NewTask, Task};
use crate::scopes::ScopeBuilder;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub project_id: Option<Uuid>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut scope = Task::scope()
        .visible_to(&identity)
        .limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT));
    if let Some(project_id) = params.project_id {
        scope = scope.for_project(project_id);
    }
    let tasks = scope.all(&state.pool).await?;
    Ok(Json(serde_json::json!({ "items": tasks })))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(new_task): Json<NewTask>,
) -> Result<(axum::http::StatusCode, Json<Task>), ApiError> {
    authorize_mutation(&identity, &Mutation::CreateRecord(RecordKind::Task))?;

    let task = Task::create(&state.pool, new_task).await?;

    state
        .audit
        .record(AuditEvent::new(
            identity.user_id,
            audit::TASK_CREATE,
            "task",
            task.id,
        ))
        .await;

    Ok((axum::http::StatusCode::CREATED, Json(task)))
}

pub async fn patch_task(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::bad_request("empty task patch"));
    }

    // Scoped lookup: a task outside the caller's visibility reads as
    // missing rather than leaking its existence through a 403.
    let task = Task::scope()
        .visible_to(&identity)
        .with_id(id)
        .first(&state.pool)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Err(denial) = authorize_mutation(
        &identity,
        &Mutation::UpdateTask {
            task: &task,
            patch: &patch,
        },
    ) {
        state
            .audit
            .record(AuditEvent::access_denied(
                identity.user_id,
                "task",
                denial.reason,
            ))
            .await;
        return Err(denial.into());
    }

    let updated = Task::update(&state.pool, id, &patch)
        .await?
        .ok_or(ApiError::NotFound)?;

    state
        .audit
        .record(
            AuditEvent::new(identity.user_id, audit::TASK_UPDATE, "task", updated.id)
                .with_metadata(serde_json::to_value(&patch).unwrap_or_default()),
        )
        .await;

    Ok(Json(updated))
}
