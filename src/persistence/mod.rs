//! Persistence layer: event registry, token store, and attendance ledger.
//!
//! [`AttendanceStore`] is the seam between the service layer and storage.
//! Two implementations exist: [`memory::MemoryStore`] for tests and
//! database-less runs, and [`postgres::PostgresStore`] backed by
//! `sqlx::PgPool`.
//!
//! Every "current time" the store uses (token expiry, registration and
//! check-in timestamps) comes from the store itself, never from the client.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{AttendanceRecord, AttendanceToken, Event, EventDraft, EventId, UserId};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Storage-level failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A registration for this (event, user) pair already exists.
    #[error("user {user_id} is already registered for event {event_id}")]
    DuplicateRegistration {
        /// Event in the conflicting row.
        event_id: EventId,
        /// User in the conflicting row.
        user_id: UserId,
    },

    /// The referenced event does not exist.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// The event still has attendance rows and cannot be deleted.
    #[error("event {0} is referenced by attendance records")]
    EventInUse(EventId),

    /// A computed timestamp falls outside the representable range.
    #[error("timestamp out of range: {0}")]
    TimeOutOfRange(String),

    /// A stored value could not be mapped back to the domain model.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// Database driver or connection failure.
    #[error("database error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Backend(e.to_string())
    }
}

/// Which events [`AttendanceStore::list_events`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event, newest first.
    All,
    /// Active events that have not started yet, soonest first.
    Upcoming,
}

/// Storage operations required by the services.
#[async_trait::async_trait]
pub trait AttendanceStore: Debug + Send + Sync {
    // ── Event registry ──────────────────────────────────────────────────

    /// Inserts a new event and returns it with its assigned identifier.
    async fn insert_event(&self, draft: EventDraft) -> Result<Event, StoreError>;

    /// Fetches an event by identifier.
    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>, StoreError>;

    /// Replaces every editable field of an event.
    ///
    /// Returns `None` if the event does not exist.
    async fn update_event(
        &self,
        event_id: EventId,
        draft: EventDraft,
    ) -> Result<Option<Event>, StoreError>;

    /// Lists events matching `filter`.
    async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError>;

    /// Deletes an event together with its token.
    ///
    /// Returns `false` if the event does not exist. Fails with
    /// [`StoreError::EventInUse`] while any attendance row references it.
    async fn delete_event(&self, event_id: EventId) -> Result<bool, StoreError>;

    // ── Token store ─────────────────────────────────────────────────────

    /// Stores `secret` as the one current token for `event_id`, expiring
    /// `validity` after the store's current time.
    ///
    /// Any previous token for the event is overwritten. Fails with
    /// [`StoreError::TimeOutOfRange`] if the expiry cannot be represented.
    async fn replace_token(
        &self,
        event_id: EventId,
        secret: String,
        validity: Duration,
    ) -> Result<AttendanceToken, StoreError>;

    /// Returns the token for `event_id` if its secret equals `secret` and it
    /// expires strictly after the store's current time.
    async fn find_live_token(
        &self,
        event_id: EventId,
        secret: &str,
    ) -> Result<Option<AttendanceToken>, StoreError>;

    // ── Attendance ledger ───────────────────────────────────────────────

    /// Records a registration stamped with the store's current time.
    ///
    /// Fails with [`StoreError::DuplicateRegistration`] if the pair exists
    /// and [`StoreError::EventNotFound`] if the event does not.
    async fn insert_registration(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<AttendanceRecord, StoreError>;

    /// Fetches the ledger row for `(event_id, user_id)`.
    async fn get_record(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Sets the check-in timestamp to the store's current time, but only if
    /// the row exists and has not been checked in yet.
    ///
    /// Returns the new timestamp, or `None` if no row was updated. This is a
    /// single compare-and-set: of two racing calls at most one gets `Some`.
    async fn mark_checked_in(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Number of registrations for an event.
    async fn count_registrations(&self, event_id: EventId) -> Result<u64, StoreError>;

    /// All ledger rows of an event, oldest registration first.
    async fn list_records(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Events a user is registered for.
    async fn registered_event_ids(&self, user_id: UserId) -> Result<Vec<EventId>, StoreError>;
}
