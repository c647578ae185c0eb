//! Database rows and their mapping onto the domain model.

use chrono::{DateTime, Utc};

use super::StoreError;
use crate::domain::{AttendanceRecord, AttendanceToken, Event, EventId, EventStatus, UserId};

/// A row from the `events` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Primary key.
    pub event_id: i64,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Scheduled start.
    pub event_date: DateTime<Utc>,
    /// Location.
    pub location: String,
    /// Organizer.
    pub organizer: Option<String>,
    /// Status string, one of `active`, `completed`, `cancelled`, `tba`.
    pub status: String,
    /// Capacity, `0` for unlimited.
    pub max_capacity: i32,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<EventStatus>()
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let max_capacity = u32::try_from(row.max_capacity).map_err(|_| {
            StoreError::Corrupt(format!(
                "negative capacity {} on event {}",
                row.max_capacity, row.event_id
            ))
        })?;
        Ok(Self {
            id: EventId::new(row.event_id),
            title: row.title,
            description: row.description,
            starts_at: row.event_date,
            location: row.location,
            organizer: row.organizer,
            status,
            max_capacity,
        })
    }
}

/// A row from the `attendance_tokens` table.
#[derive(Clone, sqlx::FromRow)]
pub struct TokenRow {
    /// Owning event (primary key).
    pub event_id: i64,
    /// Token secret.
    pub secret: String,
    /// Expiration instant.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for TokenRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRow")
            .field("event_id", &self.event_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

impl From<TokenRow> for AttendanceToken {
    fn from(row: TokenRow) -> Self {
        Self {
            event_id: EventId::new(row.event_id),
            secret: row.secret,
            expires_at: row.expires_at,
        }
    }
}

/// A row from the `attendance` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AttendanceRow {
    /// Event key.
    pub event_id: i64,
    /// User key.
    pub user_id: i64,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
    /// Check-in timestamp, `NULL` until checked in.
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        Self {
            event_id: EventId::new(row.event_id),
            user_id: UserId::new(row.user_id),
            registered_at: row.registered_at,
            checked_in_at: row.checked_in_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn row(status: &str, max_capacity: i32) -> EventRow {
        EventRow {
            event_id: 42,
            title: "Career fair".to_string(),
            description: None,
            event_date: Utc::now(),
            location: "Main hall".to_string(),
            organizer: Some("Student council".to_string()),
            status: status.to_string(),
            max_capacity,
        }
    }

    #[test]
    fn event_row_maps_to_domain() {
        let Ok(event) = Event::try_from(row("active", 50)) else {
            panic!("mapping failed");
        };
        assert_eq!(event.id, EventId::new(42));
        assert_eq!(event.status, EventStatus::Active);
        assert_eq!(event.max_capacity, 50);
    }

    #[test]
    fn unknown_status_is_corrupt() {
        let result = Event::try_from(row("postponed", 0));
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn negative_capacity_is_corrupt() {
        let result = Event::try_from(row("active", -1));
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
