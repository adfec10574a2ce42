//! # User Model
//!
//! Login accounts. `password_hash` holds the PBKDF2 credential from
//! [`crate::auth::password`]; `customer_id` links customer-portal accounts
//! to the customer record they own. The hash never leaves the data layer;
//! the serialized form skips it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::Identity;
use crate::constants::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub customer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// New user for creation; the caller hashes the password first.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub customer_id: Option<Uuid>,
}

impl User {
    pub async fn create(pool: &PgPool, new_user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, name, email, password_hash, role, customer_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(new_user.name)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.role)
        .bind(new_user.customer_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// The request identity this account resolves to.
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            role: self.role,
            customer_id: self.customer_id,
        }
    }
}
