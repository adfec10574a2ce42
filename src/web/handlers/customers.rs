//! Customer endpoints.
//!
//! Removal is the strictest path in the system: soft-delete and
//! anonymization are admin-only, and both are idempotent so a retried
//! delete never surfaces as an error.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::audit::AuditEvent;
use crate::auth::Identity;
use crate::authorization::{authorize_mutation, Mutation, RecordKind};
use crate::constants::{audit, Role, DEFAULT_LIST_LIMIT};
use crate::models::{Building, Customer, CustomerPatch, NewCustomer};
use crate::scopes::ScopeBuilder;
use crate::web::errors::ApiError;
use crate::web::middleware::auth::require_roles;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}

pub async fn list_customers(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Archived customers are reachable only through the explicit
    // admin-gated path; every other listing is scoped.
    let scope = if params.include_deleted {
        require_roles(&identity, &[Role::Admin])?;
        Customer::scope().including_deleted()
    } else {
        Customer::scope().visible_to(&identity)
    };

    let customers = scope
        .limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT))
        .all(&state.pool)
        .await?;
    Ok(Json(serde_json::json!({ "items": customers })))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let customer = Customer::scope()
        .visible_to(&identity)
        .with_id(id)
        .first(&state.pool)
        .await?
        .ok_or(ApiError::NotFound)?;

    let buildings = Building::for_customer(&state.pool, customer.id).await?;

    Ok(Json(serde_json::json!({
        "customer": customer,
        "buildings": buildings,
    })))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(new_customer): Json<NewCustomer>,
) -> Result<(axum::http::StatusCode, Json<Customer>), ApiError> {
    authorize_mutation(&identity, &Mutation::CreateRecord(RecordKind::Customer))?;

    let customer = Customer::create(&state.pool, new_customer).await?;

    state
        .audit
        .record(AuditEvent::new(
            identity.user_id,
            audit::CUSTOMER_CREATE,
            "customer",
            customer.id,
        ))
        .await;

    Ok((axum::http::StatusCode::CREATED, Json(customer)))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(patch): Json<CustomerPatch>,
) -> Result<Json<Customer>, ApiError> {
    authorize_mutation(&identity, &Mutation::UpdateRecord(RecordKind::Customer))?;

    let customer = Customer::update(&state.pool, id, patch)
        .await?
        .ok_or(ApiError::NotFound)?;

    state
        .audit
        .record(AuditEvent::new(
            identity.user_id,
            audit::CUSTOMER_UPDATE,
            "customer",
            customer.id,
        ))
        .await;

    Ok(Json(customer))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub anonymize: bool,
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Err(denial) = authorize_mutation(
        &identity,
        &Mutation::DeleteCustomer {
            anonymize: params.anonymize,
        },
    ) {
        state
            .audit
            .record(AuditEvent::access_denied(
                identity.user_id,
                "customer",
                denial.reason,
            ))
            .await;
        return Err(denial.into());
    }

    let customer = Customer::soft_delete(&state.pool, id, params.anonymize)
        .await?
        .ok_or(ApiError::NotFound)?;

    let action = if params.anonymize {
        audit::CUSTOMER_ANONYMIZE
    } else {
        audit::CUSTOMER_SOFT_DELETE
    };
    state
        .audit
        .record(
            AuditEvent::new(identity.user_id, action, "customer", customer.id)
                .with_metadata(serde_json::json!({ "anonymize": params.anonymize })),
        )
        .await;

    Ok(Json(serde_json::json!({ "ok": true })))
}
