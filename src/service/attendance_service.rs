//! Attendance service: token issuance and the check-in state machine.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::token::generate_secret;
use crate::domain::{AttendanceRecord, EventId, UserId};
use crate::error::ApiError;
use crate::persistence::AttendanceStore;

/// Result of [`AttendanceService::issue_token`].
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Event the token admits check-ins for.
    pub event_id: EventId,
    /// Secret to encode into the QR code.
    pub token: String,
    /// Instant the token stops validating.
    pub expires_at: DateTime<Utc>,
    /// Configured validity window in seconds.
    pub expires_in_seconds: u64,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("event_id", &self.event_id)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("expires_in_seconds", &self.expires_in_seconds)
            .finish()
    }
}

/// Result of a successful [`AttendanceService::check_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInReceipt {
    /// Event checked in to.
    pub event_id: EventId,
    /// User who checked in.
    pub user_id: UserId,
    /// Store time of the check-in.
    pub checked_in_at: DateTime<Utc>,
}

/// Issues attendance tokens and advances ledger rows to checked-in.
///
/// Holds no state of its own; the token store and ledger live behind
/// [`AttendanceStore`].
#[derive(Debug, Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    token_validity: Duration,
}

impl AttendanceService {
    /// Creates a new `AttendanceService`.
    #[must_use]
    pub fn new(store: Arc<dyn AttendanceStore>, token_validity: Duration) -> Self {
        Self {
            store,
            token_validity,
        }
    }

    /// Issues a fresh token for an active event, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ActiveEventNotFound`] if the event is missing or
    /// not active, or a persistence error.
    pub async fn issue_token(&self, event_id: EventId) -> Result<IssuedToken, ApiError> {
        match self.store.get_event(event_id).await? {
            Some(event) if event.is_active() => {}
            _ => return Err(ApiError::ActiveEventNotFound(event_id)),
        }

        let token = self
            .store
            .replace_token(event_id, generate_secret(), self.token_validity)
            .await?;

        tracing::info!(%event_id, expires_at = %token.expires_at, "attendance token issued");

        Ok(IssuedToken {
            event_id,
            token: token.secret,
            expires_at: token.expires_at,
            expires_in_seconds: u64::try_from(self.token_validity.num_seconds()).unwrap_or(0),
        })
    }

    /// Checks `user_id` in to `event_id` with a scanned token.
    ///
    /// Validation runs in a fixed order and stops at the first failure:
    /// input presence, token validity, registration, already checked in.
    /// The token is checked before anything about the user so that a bad
    /// token reveals nothing about registrations.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidRequest`] if the event id or token is missing.
    /// - [`ApiError::InvalidToken`] if no live token matches.
    /// - [`ApiError::NotRegistered`] if the user has no registration.
    /// - [`ApiError::AlreadyCheckedIn`] if the user already checked in,
    ///   including when a concurrent request won the race.
    pub async fn check_in(
        &self,
        event_id: Option<EventId>,
        scanned_token: &str,
        user_id: UserId,
    ) -> Result<CheckInReceipt, ApiError> {
        let result = self.try_check_in(event_id, scanned_token, user_id).await;
        if let Err(e) = &result {
            tracing::warn!(
                event_id = event_id.map(EventId::get),
                %user_id,
                kind = e.kind(),
                "check-in rejected"
            );
        }
        result
    }

    async fn try_check_in(
        &self,
        event_id: Option<EventId>,
        scanned_token: &str,
        user_id: UserId,
    ) -> Result<CheckInReceipt, ApiError> {
        let event_id = match event_id {
            Some(id) if id.get() > 0 && !scanned_token.trim().is_empty() => id,
            _ => {
                return Err(ApiError::InvalidRequest(
                    "missing event ID or scanned token".to_string(),
                ));
            }
        };

        if self
            .store
            .find_live_token(event_id, scanned_token)
            .await?
            .is_none()
        {
            return Err(ApiError::InvalidToken);
        }

        let Some(record) = self.store.get_record(event_id, user_id).await? else {
            return Err(ApiError::NotRegistered(event_id));
        };
        if record.checked_in_at.is_some() {
            return Err(ApiError::AlreadyCheckedIn(event_id));
        }

        // Losing a race against a concurrent check-in leaves zero rows updated.
        let Some(checked_in_at) = self.store.mark_checked_in(event_id, user_id).await? else {
            return Err(ApiError::AlreadyCheckedIn(event_id));
        };

        tracing::info!(%event_id, %user_id, %checked_in_at, "attendance recorded");

        Ok(CheckInReceipt {
            event_id,
            user_id,
            checked_in_at,
        })
    }

    /// Returns every registration of an event with its check-in state.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event does not exist, or a
    /// persistence error.
    pub async fn roster(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, ApiError> {
        if self.store.get_event(event_id).await?.is_none() {
            return Err(ApiError::EventNotFound(event_id));
        }
        Ok(self.store.list_records(event_id).await?)
    }
}
