//! Login and self-service customer registration.
//!
//! Login failures are deliberately uniform: a missing account and a wrong
//! password produce the same 401 so the endpoint does not leak which
//! emails exist.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use crate::audit::AuditEvent;
use crate::auth::{hash_password, verify_password};
use crate::constants::{audit, Role};
use crate::models::{Customer, NewCustomer, NewUser, User};
use crate::web::errors::ApiError;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = User::find_by_email(&state.pool, &body.email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash) {
        warn!(email = %body.email, "failed login attempt");
        return Err(ApiError::Unauthorized);
    }

    let identity = user.identity();
    let token = state.tokens.issue(&identity).map_err(|e| {
        warn!(error = %e, "token issuance failed");
        ApiError::Internal
    })?;

    Ok(Json(serde_json::json!({
        "token": token,
        "user": user,
    })))
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub full_name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

fn validate_registration(body: &RegisterBody) -> Result<(), ApiError> {
    if body.full_name.trim().len() < 2 {
        return Err(ApiError::bad_request("name is required"));
    }
    if body.company_name.trim().len() < 2 {
        return Err(ApiError::bad_request("company name is required"));
    }
    if !body.email.contains('@') {
        return Err(ApiError::bad_request("provide a valid email"));
    }
    if body.phone.trim().len() < 7 {
        return Err(ApiError::bad_request("phone number is required"));
    }
    let password = &body.password;
    if password.len() < 8
        || !password.chars().any(|c| c.is_ascii_uppercase())
        || !password.chars().any(|c| c.is_ascii_lowercase())
        || !password.chars().any(|c| !c.is_ascii_alphanumeric())
    {
        return Err(ApiError::bad_request(
            "password must be 8+ characters with upper, lower, and a symbol",
        ));
    }
    Ok(())
}

/// Public registration always provisions a customer-portal account: a new
/// customer record plus a user linked to it. Staff roles are never
/// assignable from this endpoint.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validate_registration(&body)?;

    if User::find_by_email(&state.pool, &body.email).await?.is_some() {
        return Err(ApiError::Conflict);
    }

    let customer = Customer::create(
        &state.pool,
        NewCustomer {
            name: body.company_name.clone(),
            contact_email: body.email.clone(),
            contact_phone: Some(body.phone.clone()),
            billing_address: None,
            notes: None,
        },
    )
    .await?;

    let user = User::create(
        &state.pool,
        NewUser {
            name: body.full_name.clone(),
            email: body.email.clone(),
            password_hash: hash_password(&body.password),
            role: Role::Customer,
            customer_id: Some(customer.id),
        },
    )
    .await?;

    state
        .audit
        .record(
            AuditEvent::new(user.id, audit::AUTH_REGISTER, "user", user.id)
                .with_metadata(serde_json::json!({ "role": Role::Customer })),
        )
        .await;

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(password: &str) -> RegisterBody {
        RegisterBody {
            full_name: "Dana Ortiz".to_string(),
            company_name: "Harbor Point Realty".to_string(),
            email: "dana@harborpoint.com".to_string(),
            phone: "+1 555-200-1000".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn strong_passwords_pass() {
        assert!(validate_registration(&body("Str0ng!pass")).is_ok());
    }

    #[test]
    fn weak_passwords_fail() {
        for weak in ["short1!", "alllowercase1!", "ALLUPPERCASE1!", "NoSymbols11"] {
            assert!(validate_registration(&body(weak)).is_err(), "{weak}");
        }
    }
}
