// Module database - trip history, PostgreSQL or in-memory
// Every read is scoped by the caller's user id.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, postgres::PgPoolOptions};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Trip not found: {0}")]
    NotFound(i32),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A persisted trip. Written once per successful plan, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: i32,
    pub user_id: i32,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
    pub predicted_consumption: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a trip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewTrip {
    pub user_id: i32,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
    pub predicted_consumption: Option<f64>,
}

#[async_trait]
pub trait TripStore: Send + Sync {
    async fn create_trip(&self, trip: NewTrip) -> Result<Trip, DatabaseError>;

    /// The user's trips, newest first.
    async fn list_trips(&self, user_id: i32) -> Result<Vec<Trip>, DatabaseError>;

    /// `NotFound` both when the id does not exist and when another user owns it.
    async fn get_trip(&self, user_id: i32, id: i32) -> Result<Trip, DatabaseError>;
}

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create new database connection pool
    ///
    /// # Errors
    /// Returns DatabaseError if the URL is empty or the connection fails
    pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        if database_url.trim().is_empty() {
            return Err(DatabaseError::ConfigError(
                "DATABASE_URL is empty".to_string(),
            ));
        }

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool created");

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        // query() rejects multi-statement scripts
        let mut conn = self.pool.acquire().await?;

        let migration_sql = include_str!("../migrations/20250301_create_trips.sql");
        sqlx::raw_sql(migration_sql).execute(&mut *conn).await?;

        tracing::info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl TripStore for Database {
    async fn create_trip(&self, trip: NewTrip) -> Result<Trip, DatabaseError> {
        let saved = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (
                user_id, start_latitude, start_longitude,
                end_latitude, end_longitude, predicted_consumption
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(trip.user_id)
        .bind(trip.start_latitude)
        .bind(trip.start_longitude)
        .bind(trip.end_latitude)
        .bind(trip.end_longitude)
        .bind(trip.predicted_consumption)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Trip saved: ID {} for user {}", saved.id, saved.user_id);
        Ok(saved)
    }

    async fn list_trips(&self, user_id: i32) -> Result<Vec<Trip>, DatabaseError> {
        let trips = sqlx::query_as::<_, Trip>(
            "SELECT * FROM trips WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!("Retrieved {} trips for user {}", trips.len(), user_id);
        Ok(trips)
    }

    async fn get_trip(&self, user_id: i32, id: i32) -> Result<Trip, DatabaseError> {
        sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DatabaseError::NotFound(id))
    }
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct InMemoryTripStore {
    trips: Mutex<Vec<Trip>>,
}

impl InMemoryTripStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Trip>> {
        // A panic while holding the lock cannot leave a half-written trip.
        self.trips.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TripStore for InMemoryTripStore {
    async fn create_trip(&self, trip: NewTrip) -> Result<Trip, DatabaseError> {
        let mut trips = self.lock();
        let id = trips.last().map_or(1, |last| last.id + 1);
        let saved = Trip {
            id,
            user_id: trip.user_id,
            start_latitude: trip.start_latitude,
            start_longitude: trip.start_longitude,
            end_latitude: trip.end_latitude,
            end_longitude: trip.end_longitude,
            predicted_consumption: trip.predicted_consumption,
            created_at: Utc::now(),
        };
        trips.push(saved.clone());

        tracing::info!("Trip saved in memory: ID {} for user {}", saved.id, saved.user_id);
        Ok(saved)
    }

    async fn list_trips(&self, user_id: i32) -> Result<Vec<Trip>, DatabaseError> {
        let mut trips: Vec<Trip> = self
            .lock()
            .iter()
            .filter(|trip| trip.user_id == user_id)
            .cloned()
            .collect();
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(trips)
    }

    async fn get_trip(&self, user_id: i32, id: i32) -> Result<Trip, DatabaseError> {
        self.lock()
            .iter()
            .find(|trip| trip.id == id && trip.user_id == user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound(id))
    }
}
