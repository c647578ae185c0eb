//! PostgreSQL implementation of the persistence layer.
//!
//! All timestamps come from the database's `NOW()`, so token expiry and
//! check-in times are immune to application or client clock skew.

use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use super::models::{AttendanceRow, EventRow, TokenRow};
use super::{AttendanceStore, EventFilter, StoreError};
use crate::config::AppConfig;
use crate::domain::{AttendanceRecord, AttendanceToken, Event, EventDraft, EventId, UserId};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const EVENT_COLUMNS: &str =
    "event_id, title, description, event_date, location, organizer, status, max_capacity";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the pool settings in `config` and applies pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the connection or a migration fails.
    pub async fn connect(config: &AppConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(StdDuration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        MIGRATOR.run(&pool).await?;
        tracing::info!("database migrations applied");

        Ok(Self::new(pool))
    }
}

fn capacity_column(max_capacity: u32) -> Result<i32, StoreError> {
    i32::try_from(max_capacity)
        .map_err(|_| StoreError::Corrupt(format!("capacity {max_capacity} out of range")))
}

#[async_trait::async_trait]
impl AttendanceStore for PostgresStore {
    async fn insert_event(&self, draft: EventDraft) -> Result<Event, StoreError> {
        let sql = format!(
            "INSERT INTO events (title, description, event_date, location, organizer, status, max_capacity) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.starts_at)
            .bind(&draft.location)
            .bind(&draft.organizer)
            .bind(draft.status.as_str())
            .bind(capacity_column(draft.max_capacity)?)
            .fetch_one(&self.pool)
            .await?;

        Event::try_from(row)
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = $1");
        sqlx::query_as::<_, EventRow>(&sql)
            .bind(event_id.get())
            .fetch_optional(&self.pool)
            .await?
            .map(Event::try_from)
            .transpose()
    }

    async fn update_event(
        &self,
        event_id: EventId,
        draft: EventDraft,
    ) -> Result<Option<Event>, StoreError> {
        let sql = format!(
            "UPDATE events SET title = $2, description = $3, event_date = $4, location = $5, \
             organizer = $6, status = $7, max_capacity = $8 \
             WHERE event_id = $1 RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, EventRow>(&sql)
            .bind(event_id.get())
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(draft.starts_at)
            .bind(&draft.location)
            .bind(&draft.organizer)
            .bind(draft.status.as_str())
            .bind(capacity_column(draft.max_capacity)?)
            .fetch_optional(&self.pool)
            .await?
            .map(Event::try_from)
            .transpose()
    }

    async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let sql = match filter {
            EventFilter::All => {
                format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date DESC")
            }
            EventFilter::Upcoming => format!(
                "SELECT {EVENT_COLUMNS} FROM events \
                 WHERE status = 'active' AND event_date >= NOW() ORDER BY event_date ASC"
            ),
        };
        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    async fn delete_event(&self, event_id: EventId) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM attendance_tokens WHERE event_id = $1")
            .bind(event_id.get())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM events WHERE event_id = $1")
            .bind(event_id.get())
            .execute(&mut *tx)
            .await;

        match result {
            Ok(done) => {
                tx.commit().await?;
                Ok(done.rows_affected() > 0)
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(StoreError::EventInUse(event_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_token(
        &self,
        event_id: EventId,
        secret: String,
        validity: Duration,
    ) -> Result<AttendanceToken, StoreError> {
        if Utc::now().checked_add_signed(validity).is_none() {
            return Err(StoreError::TimeOutOfRange(format!(
                "token expiry for event {event_id}"
            )));
        }
        #[allow(clippy::cast_precision_loss)]
        let validity_secs = validity.num_milliseconds() as f64 / 1000.0;

        let row = sqlx::query_as::<_, TokenRow>(
            "INSERT INTO attendance_tokens (event_id, secret, expires_at) \
             VALUES ($1, $2, NOW() + make_interval(secs => $3)) \
             ON CONFLICT (event_id) DO UPDATE \
             SET secret = EXCLUDED.secret, expires_at = EXCLUDED.expires_at \
             RETURNING event_id, secret, expires_at",
        )
        .bind(event_id.get())
        .bind(secret)
        .bind(validity_secs)
        .fetch_one(&self.pool)
        .await?;

        Ok(AttendanceToken::from(row))
    }

    async fn find_live_token(
        &self,
        event_id: EventId,
        secret: &str,
    ) -> Result<Option<AttendanceToken>, StoreError> {
        let row = sqlx::query_as::<_, TokenRow>(
            "SELECT event_id, secret, expires_at FROM attendance_tokens \
             WHERE event_id = $1 AND secret = $2 AND expires_at > NOW()",
        )
        .bind(event_id.get())
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AttendanceToken::from))
    }

    async fn insert_registration(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query_as::<_, AttendanceRow>(
            "INSERT INTO attendance (event_id, user_id) VALUES ($1, $2) \
             RETURNING event_id, user_id, registered_at, checked_in_at",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(AttendanceRecord::from(row)),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateRegistration { event_id, user_id })
            }
            Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
                Err(StoreError::EventNotFound(event_id))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_record(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            "SELECT event_id, user_id, registered_at, checked_in_at FROM attendance \
             WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AttendanceRecord::from))
    }

    async fn mark_checked_in(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let stamped = sqlx::query_scalar::<_, DateTime<Utc>>(
            "UPDATE attendance SET checked_in_at = NOW() \
             WHERE event_id = $1 AND user_id = $2 AND checked_in_at IS NULL \
             RETURNING checked_in_at",
        )
        .bind(event_id.get())
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(stamped)
    }

    async fn count_registrations(&self, event_id: EventId) -> Result<u64, StoreError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM attendance WHERE event_id = $1")
                .bind(event_id.get())
                .fetch_one(&self.pool)
                .await?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn list_records(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceRow>(
            "SELECT event_id, user_id, registered_at, checked_in_at FROM attendance \
             WHERE event_id = $1 ORDER BY registered_at ASC, user_id ASC",
        )
        .bind(event_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(AttendanceRecord::from).collect())
    }

    async fn registered_event_ids(&self, user_id: UserId) -> Result<Vec<EventId>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT event_id FROM attendance WHERE user_id = $1 ORDER BY event_id ASC",
        )
        .bind(user_id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(EventId::new).collect())
    }
}
