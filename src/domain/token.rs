//! Short-lived attendance tokens encoded into QR codes.
//!
//! A token proves presence at an event, not identity: any registered
//! student who scans it before it expires may check in.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;

use super::EventId;

/// Number of random bytes in a token secret (hex encoded to 64 chars).
pub const TOKEN_SECRET_BYTES: usize = 32;

/// Generates a new hex-encoded token secret from the OS CSPRNG.
#[must_use]
pub fn generate_secret() -> String {
    let mut bytes = [0u8; TOKEN_SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The single current token for an event.
#[derive(Clone, PartialEq, Eq)]
pub struct AttendanceToken {
    /// Event the token admits check-ins for.
    pub event_id: EventId,
    /// Opaque secret value.
    pub secret: String,
    /// Instant at which the token stops validating.
    pub expires_at: DateTime<Utc>,
}

impl AttendanceToken {
    /// Returns `true` if the token is still valid at `now`.
    ///
    /// Validity is strict: at exactly `expires_at` the token is expired.
    #[must_use]
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Returns `true` if this token belongs to `event_id`, has the given
    /// secret, and is live at `now`.
    #[must_use]
    pub fn admits(&self, event_id: EventId, secret: &str, now: DateTime<Utc>) -> bool {
        self.event_id == event_id && self.secret == secret && self.is_live_at(now)
    }
}

// Secrets never end up in logs.
impl fmt::Debug for AttendanceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttendanceToken")
            .field("event_id", &self.event_id)
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
