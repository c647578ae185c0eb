//! Attendance token, check-in, and roster DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::domain::{AttendanceRecord, AttendanceState};
use crate::service::{CheckInReceipt, IssuedToken};

/// Response body for `POST /attendance/{event_id}/token`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueTokenResponse {
    /// Confirmation message.
    pub message: String,
    /// Event the token is for.
    pub event_id: i64,
    /// Secret to encode into the QR code.
    pub token: String,
    /// Instant the token stops validating.
    pub expires_at: DateTime<Utc>,
    /// Validity window in seconds.
    pub expires_in_seconds: u64,
}

impl From<IssuedToken> for IssueTokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            message: "New QR token generated.".to_string(),
            event_id: issued.event_id.get(),
            token: issued.token,
            expires_at: issued.expires_at,
            expires_in_seconds: issued.expires_in_seconds,
        }
    }
}

/// Request body for `POST /attendance/check-in`.
///
/// Both fields are optional at the JSON level so that a missing value is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckInRequest {
    /// Event to check in to. Accepts a JSON integer or a numeric string.
    #[serde(default, alias = "eventId", deserialize_with = "lenient_event_id")]
    #[schema(value_type = Option<i64>)]
    pub event_id: Option<i64>,
    /// Token value decoded from the QR code.
    #[serde(default, alias = "scannedToken")]
    pub scanned_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventIdInput {
    Number(i64),
    Text(String),
}

/// QR payloads often carry the event id as a string. A string that is not a
/// number is treated as absent.
fn lenient_event_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<EventIdInput>::deserialize(deserializer)? {
            Some(EventIdInput::Number(id)) => Some(id),
            Some(EventIdInput::Text(text)) => text.trim().parse().ok(),
            None => None,
        },
    )
}

/// Response body for a successful check-in.
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckInResponse {
    /// Confirmation message.
    pub message: String,
    /// Event checked in to.
    pub event_id: i64,
    /// Check-in timestamp.
    pub checked_in_at: DateTime<Utc>,
}

impl From<CheckInReceipt> for CheckInResponse {
    fn from(receipt: CheckInReceipt) -> Self {
        Self {
            message: "Attendance successfully recorded!".to_string(),
            event_id: receipt.event_id.get(),
            checked_in_at: receipt.checked_in_at,
        }
    }
}

/// One row of an event roster.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterEntryDto {
    /// Registered user.
    pub user_id: i64,
    /// Registration timestamp.
    pub registered_at: DateTime<Utc>,
    /// Check-in timestamp, if checked in.
    pub checked_in_at: Option<DateTime<Utc>>,
    /// Derived check-in state.
    pub state: AttendanceState,
}

impl From<AttendanceRecord> for RosterEntryDto {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            state: record.state(),
            user_id: record.user_id.get(),
            registered_at: record.registered_at,
            checked_in_at: record.checked_in_at,
        }
    }
}

/// Response body for `GET /events/{event_id}/attendance`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    /// Event the roster belongs to.
    pub event_id: i64,
    /// Number of registrations.
    pub registered: usize,
    /// Number of registrations that checked in.
    pub checked_in: usize,
    /// Registrations, oldest first.
    pub entries: Vec<RosterEntryDto>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Option<CheckInRequest> {
        serde_json::from_str(body).ok()
    }

    #[test]
    fn event_id_accepts_number_or_numeric_string() {
        let numeric = parse(r#"{"eventId": 42, "scannedToken": "abc"}"#);
        assert_eq!(numeric.and_then(|r| r.event_id), Some(42));

        let text = parse(r#"{"eventId": "42", "scannedToken": "abc"}"#);
        assert_eq!(text.and_then(|r| r.event_id), Some(42));
    }

    #[test]
    fn unusable_event_id_reads_as_missing() {
        let Some(req) = parse(r#"{"event_id": "forty-two"}"#) else {
            panic!("body should deserialize");
        };
        assert_eq!(req.event_id, None);

        let Some(req) = parse(r#"{"event_id": null, "scanned_token": "abc"}"#) else {
            panic!("body should deserialize");
        };
        assert_eq!(req.event_id, None);
        assert_eq!(req.scanned_token.as_deref(), Some("abc"));

        let Some(req) = parse("{}") else {
            panic!("empty object should deserialize");
        };
        assert_eq!(req.event_id, None);
    }
}
