//! Attendance ledger rows and their check-in state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, UserId};

/// Check-in state of an [`AttendanceRecord`].
///
/// `Registered -> CheckedIn` is the only transition; `CheckedIn` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    /// Registered, not yet checked in.
    Registered,
    /// Checked in.
    CheckedIn,
}

/// One user's registration for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttendanceRecord {
    /// Event registered for.
    pub event_id: EventId,
    /// Registered user.
    pub user_id: UserId,
    /// When the registration was recorded.
    pub registered_at: DateTime<Utc>,
    /// When the user checked in, if they have.
    pub checked_in_at: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// Creates a fresh registration with no check-in.
    #[must_use]
    pub fn registered(event_id: EventId, user_id: UserId, registered_at: DateTime<Utc>) -> Self {
        Self {
            event_id,
            user_id,
            registered_at,
            checked_in_at: None,
        }
    }

    /// Returns the current check-in state.
    #[must_use]
    pub fn state(&self) -> AttendanceState {
        if self.checked_in_at.is_some() {
            AttendanceState::CheckedIn
        } else {
            AttendanceState::Registered
        }
    }
}
