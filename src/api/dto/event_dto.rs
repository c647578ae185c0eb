//! Event and registration DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AttendanceRecord, Event, EventDraft, EventStatus};

/// Request body for `POST /events` and `PUT /events/{event_id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EventRequest {
    /// Short title.
    pub title: String,
    /// Optional long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduled start (ISO-8601).
    pub starts_at: DateTime<Utc>,
    /// Location.
    pub location: String,
    /// Organizing club or person.
    #[serde(default)]
    pub organizer: Option<String>,
    /// Lifecycle status. Defaults to `active`.
    #[serde(default)]
    pub status: Option<EventStatus>,
    /// Capacity, `0` or absent for unlimited.
    #[serde(default)]
    pub max_capacity: Option<u32>,
}

impl From<EventRequest> for EventDraft {
    fn from(req: EventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            starts_at: req.starts_at,
            location: req.location,
            organizer: req.organizer,
            status: req.status.unwrap_or_default(),
            max_capacity: req.max_capacity.unwrap_or(0),
        }
    }
}

/// An event as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventDto {
    /// Event identifier.
    pub event_id: i64,
    /// Title.
    pub title: String,
    /// Description.
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

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            event_id: event.id.get(),
            title: event.title,
            description: event.description,
            starts_at: event.starts_at,
            location: event.location,
            organizer: event.organizer,
            status: event.status,
            max_capacity: event.max_capacity,
        }
    }
}

/// Response body for `POST /events/{event_id}/register`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RegistrationResponse {
    /// Confirmation message.
    pub message: String,
    /// Event registered for.
    pub event_id: i64,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
}

impl From<AttendanceRecord> for RegistrationResponse {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            message: "Successfully registered for the event.".to_string(),
            event_id: record.event_id.get(),
            registered_at: record.registered_at,
        }
    }
}
