//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the central error type of the service. Each variant maps
//! to a numeric code, an HTTP status, and a human-readable message that a
//! client can show as-is.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::EventId;
use crate::persistence::StoreError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "invalid or expired QR code token"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`ApiError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                    |
/// |-----------|-------------------|--------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request                |
/// | 2000–2999 | State / Not Found | 404 Not Found / 409 Conflict   |
/// | 3000–3999 | Server            | 500 Internal Server Error      |
/// | 4000–4999 | Access            | 401 Unauthorized / 403 Forbidden |
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Event with the given ID does not exist.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Event does not exist or is not active.
    #[error("active event not found: {0}")]
    ActiveEventNotFound(EventId),

    /// Scanned token is absent, belongs to another event, or has expired.
    #[error("invalid or expired QR code token")]
    InvalidToken,

    /// Caller has no registration for the event.
    #[error("you are not registered for event {0}")]
    NotRegistered(EventId),

    /// Caller already checked in to the event.
    #[error("you have already checked in for event {0}")]
    AlreadyCheckedIn(EventId),

    /// Caller already registered for the event.
    #[error("you are already registered for event {0}")]
    AlreadyRegistered(EventId),

    /// Event still has attendance records.
    #[error("event {0} has attendance records and cannot be deleted")]
    EventInUse(EventId),

    /// Event has reached its capacity.
    #[error("event {0} is full")]
    EventFull(EventId),

    /// No usable identity was supplied by the identity provider.
    #[error("authentication required: {0}")]
    Unauthenticated(String),

    /// Identity is valid but lacks the required role.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::EventNotFound(_) | Self::ActiveEventNotFound(_) => 2001,
            Self::AlreadyCheckedIn(_)
            | Self::AlreadyRegistered(_)
            | Self::EventFull(_)
            | Self::EventInUse(_) => 2002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::InvalidToken => 4001,
            Self::NotRegistered(_) => 4002,
            Self::Unauthenticated(_) => 4003,
            Self::Forbidden(_) => 4004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::EventNotFound(_) | Self::ActiveEventNotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyCheckedIn(_)
            | Self::AlreadyRegistered(_)
            | Self::EventFull(_)
            | Self::EventInUse(_) => StatusCode::CONFLICT,
            Self::InvalidToken | Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::NotRegistered(_) | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind, used as a log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "validation",
            Self::EventNotFound(_) | Self::ActiveEventNotFound(_) => "not_found",
            Self::AlreadyCheckedIn(_)
            | Self::AlreadyRegistered(_)
            | Self::EventFull(_)
            | Self::EventInUse(_) => "conflict",
            Self::InvalidToken => "authentication",
            Self::NotRegistered(_) => "authorization",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::PersistenceError(_) | Self::Internal(_) => "internal",
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateRegistration { event_id, .. } => Self::AlreadyRegistered(event_id),
            StoreError::EventNotFound(event_id) => Self::EventNotFound(event_id),
            StoreError::EventInUse(event_id) => Self::EventInUse(event_id),
            StoreError::TimeOutOfRange(_) | StoreError::Corrupt(_) | StoreError::Backend(_) => {
                Self::PersistenceError(e.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_in_failures_map_to_distinct_statuses() {
        let id = EventId::new(42);
        assert_eq!(
            ApiError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::NotRegistered(id).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::AlreadyCheckedIn(id).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::ActiveEventNotFound(id).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn check_in_failures_have_distinct_messages() {
        let id = EventId::new(42);
        let token = ApiError::InvalidToken.to_string();
        let registration = ApiError::NotRegistered(id).to_string();
        let repeat = ApiError::AlreadyCheckedIn(id).to_string();
        assert_ne!(token, registration);
        assert_ne!(registration, repeat);
        assert_ne!(token, repeat);
    }

    #[test]
    fn store_errors_convert() {
        let dup = ApiError::from(StoreError::DuplicateRegistration {
            event_id: EventId::new(1),
            user_id: crate::domain::UserId::new(2),
        });
        assert_eq!(dup.error_code(), 2002);

        let backend = ApiError::from(StoreError::Backend("down".into()));
        assert_eq!(backend.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(backend.kind(), "internal");

        let in_use = ApiError::from(StoreError::EventInUse(EventId::new(5)));
        assert_eq!(in_use.status_code(), StatusCode::CONFLICT);

        let overflow = ApiError::from(StoreError::TimeOutOfRange("expiry".into()));
        assert_eq!(overflow.error_code(), 3001);
    }

    #[test]
    fn into_response_sets_status() {
        let response = ApiError::AlreadyCheckedIn(EventId::new(3)).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
