//! Buildings a customer operates elevators in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Building {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub name: String,
    pub address: String,
    pub floors: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBuilding {
    pub customer_id: Uuid,
    pub name: String,
    pub address: String,
    pub floors: i32,
}

impl Building {
    pub async fn create(pool: &PgPool, new_building: NewBuilding) -> Result<Building, sqlx::Error> {
        sqlx::query_as::<_, Building>(
            r"
            INSERT INTO buildings (id, customer_id, name, address, floors, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(new_building.customer_id)
        .bind(new_building.name)
        .bind(new_building.address)
        .bind(new_building.floors)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Building>, sqlx::Error> {
        sqlx::query_as::<_, Building>("SELECT * FROM buildings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn for_customer(
        pool: &PgPool,
        customer_id: Uuid,
    ) -> Result<Vec<Building>, sqlx::Error> {
        sqlx::query_as::<_, Building>(
            "SELECT * FROM buildings WHERE customer_id = $1 ORDER BY name ASC",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await
    }
}
