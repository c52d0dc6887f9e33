//! Produce marketplace listings (rusqlite-backed).
//!
//! Listings are priced per quintal; the unit is fixed at creation rather than taken
//! from the client. Deletion is scoped to the owning farmer so one farmer cannot
//! remove another's listing by guessing ids.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::app::AppState;

/// Unit every listing is recorded in.
const LISTING_UNIT: &str = "quintals";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("listing not found")]
    NotFound,
}

/// A stored listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProduceListing {
    pub id: i64,
    pub farmer_id: i64,
    pub crop: String,
    pub quantity: f64,
    pub price: f64,
    pub unit: String,
}

/// Fields the farmer supplies when listing produce.
#[derive(Debug, Clone, Deserialize)]
pub struct NewListing {
    pub farmer_id: i64,
    pub crop: String,
    pub quantity: f64,
    pub price: f64,
}

/// Storage for produce listings.
#[async_trait]
pub trait ProduceStore: Send + Sync {
    async fn create(&self, listing: NewListing) -> Result<ProduceListing, StoreError>;

    async fn list_for_farmer(&self, farmer_id: i64) -> Result<Vec<ProduceListing>, StoreError>;

    /// Deletes a listing owned by `farmer_id`. `NotFound` covers both a missing id
    /// and an id owned by someone else.
    async fn delete(&self, id: i64, farmer_id: i64) -> Result<(), StoreError>;
}

/// SQLite-backed [`ProduceStore`]. Queries are short and synchronous; the connection
/// sits behind a mutex that is never held across an await.
pub struct SqliteProduceStore {
    conn: Mutex<Connection>,
}

impl SqliteProduceStore {
    pub fn new(path: &str) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS produce (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                farmer_id INTEGER NOT NULL,
                crop TEXT NOT NULL,
                quantity REAL NOT NULL,
                price REAL NOT NULL,
                unit TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl ProduceStore for SqliteProduceStore {
    async fn create(&self, listing: NewListing) -> Result<ProduceListing, StoreError> {
        let conn = self.conn.lock().expect("store lock poisoned");
        conn.execute(
            "INSERT INTO produce (farmer_id, crop, quantity, price, unit)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                listing.farmer_id,
                listing.crop,
                listing.quantity,
                listing.price,
                LISTING_UNIT
            ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(ProduceListing {
            id,
            farmer_id: listing.farmer_id,
            crop: listing.crop,
            quantity: listing.quantity,
            price: listing.price,
            unit: LISTING_UNIT.to_string(),
        })
    }

    async fn list_for_farmer(&self, farmer_id: i64) -> Result<Vec<ProduceListing>, StoreError> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, farmer_id, crop, quantity, price, unit
             FROM produce WHERE farmer_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([farmer_id], |row| {
            Ok(ProduceListing {
                id: row.get(0)?,
                farmer_id: row.get(1)?,
                crop: row.get(2)?,
                quantity: row.get(3)?,
                price: row.get(4)?,
                unit: row.get(5)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    async fn delete(&self, id: i64, farmer_id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().expect("store lock poisoned");
        let affected = conn.execute(
            "DELETE FROM produce WHERE id = ?1 AND farmer_id = ?2",
            [id, farmer_id],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FarmerQuery {
    farmer_id: i64,
}

pub(crate) async fn create(
    State(state): State<Arc<AppState>>,
    Json(listing): Json<NewListing>,
) -> (StatusCode, Json<Value>) {
    match state.produce.create(listing).await {
        Ok(stored) => {
            info!(id = stored.id, farmer = stored.farmer_id, "produce listed");
            (
                StatusCode::CREATED,
                Json(serde_json::to_value(&stored).unwrap_or_else(|_| json!(null))),
            )
        }
        Err(e) => {
            error!(error = %e, "failed to create listing");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Failed to list produce"})),
            )
        }
    }
}

pub(crate) async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FarmerQuery>,
) -> (StatusCode, Json<Value>) {
    match state.produce.list_for_farmer(query.farmer_id).await {
        Ok(listings) => (
            StatusCode::OK,
            Json(serde_json::to_value(&listings).unwrap_or_else(|_| json!([]))),
        ),
        Err(e) => {
            error!(error = %e, "failed to list produce");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}

pub(crate) async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<FarmerQuery>,
) -> (StatusCode, Json<Value>) {
    match state.produce.delete(id, query.farmer_id).await {
        Ok(()) => (StatusCode::NO_CONTENT, Json(json!(null))),
        Err(StoreError::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "listing not found"})),
        ),
        Err(e) => {
            error!(error = %e, "failed to delete listing");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
        }
    }
}
