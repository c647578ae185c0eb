//! Events that students register for and check in to.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EventId;

/// Lifecycle status of an event.
///
/// Only [`EventStatus::Active`] events accept registrations and attendance
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Scheduled and open.
    #[default]
    Active,
    /// Already took place.
    Completed,
    /// Called off.
    Cancelled,
    /// Date or details still to be announced.
    Tba,
}

impl EventStatus {
    /// Returns the lowercase wire/database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Tba => "tba",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for EventStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "tba" => Ok(Self::Tba),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Store-assigned identifier.
    pub id: EventId,
    /// Short title shown to students.
    pub title: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Scheduled start.
    pub starts_at: DateTime<Utc>,
    /// Where the event takes place.
    pub location: String,
    /// Organizing club or person.
    pub organizer: Option<String>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Maximum number of registrations; `0` means unlimited.
    pub max_capacity: u32,
}

impl Event {
    /// Builds an event from a draft and the identifier the store assigned.
    #[must_use]
    pub fn from_draft(id: EventId, draft: EventDraft) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            starts_at: draft.starts_at,
            location: draft.location,
            organizer: draft.organizer,
            status: draft.status,
            max_capacity: draft.max_capacity,
        }
    }

    /// Returns `true` if the event accepts registrations and tokens.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EventStatus::Active
    }

    /// Returns `true` if `registered` has reached a non-zero capacity.
    #[must_use]
    pub fn is_full(&self, registered: u64) -> bool {
        self.max_capacity > 0 && registered >= u64::from(self.max_capacity)
    }
}

/// All administrator-editable event fields.
///
/// Used both to create an event and to replace an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// Short title.
    pub title: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Scheduled start.
    pub starts_at: DateTime<Utc>,
    /// Location.
    pub location: String,
    /// Organizer.
    pub organizer: Option<String>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Capacity, `0` for unlimited.
    pub max_capacity: u32,
}
