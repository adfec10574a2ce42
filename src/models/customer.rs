//! # Customer Model
//!
//! Customer accounts own buildings and projects. Customers are never hard
//! deleted: removal is a soft delete, optionally with anonymization that
//! scrubs contact fields. Both forms are idempotent; repeating them
//! refreshes the anonymization timestamp instead of failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub anonymized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New customer for creation (without generated fields).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
}

/// Partial customer update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub billing_address: Option<String>,
    pub notes: Option<String>,
}

impl Customer {
    pub async fn create(pool: &PgPool, new_customer: NewCustomer) -> Result<Customer, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO customers (id, name, contact_email, contact_phone, billing_address, notes,
                                   is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, false, NOW(), NOW())
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(new_customer.name)
        .bind(new_customer.contact_email)
        .bind(new_customer.contact_phone)
        .bind(new_customer.billing_address)
        .bind(new_customer.notes)
        .fetch_one(pool)
        .await
    }

    /// Direct lookup without visibility scoping. Scoped reads go through
    /// `Customer::scope().visible_to(...)`.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, sqlx::Error> {
        sqlx::query_as::<_, Customer>(
            r"
            UPDATE customers SET
                name = COALESCE($2, name),
                contact_email = COALESCE($3, contact_email),
                contact_phone = COALESCE($4, contact_phone),
                billing_address = COALESCE($5, billing_address),
                notes = COALESCE($6, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.contact_email)
        .bind(patch.contact_phone)
        .bind(patch.billing_address)
        .bind(patch.notes)
        .fetch_optional(pool)
        .await
    }

    /// Soft delete, optionally anonymizing contact fields.
    ///
    /// Idempotent: re-running on an already-deleted customer succeeds and,
    /// with `anonymize`, refreshes the anonymization timestamp.
    pub async fn soft_delete(
        pool: &PgPool,
        id: Uuid,
        anonymize: bool,
    ) -> Result<Option<Customer>, sqlx::Error> {
        if anonymize {
            sqlx::query_as::<_, Customer>(
                r"
                UPDATE customers SET
                    is_deleted = true,
                    anonymized_at = NOW(),
                    contact_email = id::text || '@anonymized.local',
                    contact_phone = NULL,
                    billing_address = NULL,
                    notes = 'Anonymized by admin request',
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
                ",
            )
            .bind(id)
            .fetch_optional(pool)
            .await
        } else {
            sqlx::query_as::<_, Customer>(
                r"
                UPDATE customers SET
                    is_deleted = true,
                    anonymized_at = NULL,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
                ",
            )
            .bind(id)
            .fetch_optional(pool)
            .await
        }
    }
}
