//! Attendance handlers: token issuance, check-in, and event roster.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CheckInRequest, CheckInResponse, IssueTokenResponse, RosterEntryDto, RosterResponse,
};
use crate::api::identity::{Identity, Role};
use crate::app_state::AppState;
use crate::domain::{AttendanceState, EventId};
use crate::error::{ApiError, ErrorResponse};

/// `POST /attendance/{event_id}/token` — Issue a QR attendance token.
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not an admin or the event is not
/// active.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/{event_id}/token",
    tag = "Attendance",
    summary = "Issue an attendance token",
    description = "Generates a new random token for an active event, replacing any previous token. Admin only.",
    params(
        ("event_id" = i64, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Token issued", body = IssueTokenResponse),
        (status = 401, description = "Missing identity", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "Active event not found", body = ErrorResponse),
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    identity: Identity,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    identity.require(Role::Admin)?;

    let issued = state
        .attendance_service
        .issue_token(EventId::new(event_id))
        .await?;

    Ok(Json(IssueTokenResponse::from(issued)))
}

/// `POST /attendance/check-in` — Check in with a scanned token.
///
/// # Errors
///
/// Returns [`ApiError`] on missing input, invalid or expired token, missing
/// registration, or a repeated check-in.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    tag = "Attendance",
    summary = "Check in to an event",
    description = "Validates the scanned token and records the caller's attendance. Student only.",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Attendance recorded", body = CheckInResponse),
        (status = 400, description = "Malformed body, missing event ID or token", body = ErrorResponse),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse),
        (status = 403, description = "Not registered for the event", body = ErrorResponse),
        (status = 409, description = "Already checked in", body = ErrorResponse),
    )
)]
pub async fn check_in(
    State(state): State<AppState>,
    identity: Identity,
    body: Result<Json<CheckInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.require(Role::Student)?;
    let Json(req) = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let receipt = state
        .attendance_service
        .check_in(
            req.event_id.map(EventId::new),
            req.scanned_token.as_deref().unwrap_or_default(),
            user_id,
        )
        .await?;

    Ok(Json(CheckInResponse::from(receipt)))
}

/// `GET /events/{event_id}/attendance` — Event roster with check-in state.
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not an admin or the event does not
/// exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}/attendance",
    tag = "Attendance",
    summary = "Get event roster",
    description = "Lists every registration for the event and whether it has checked in. Admin only.",
    params(
        ("event_id" = i64, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event roster", body = RosterResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn roster(
    State(state): State<AppState>,
    identity: Identity,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    identity.require(Role::Admin)?;

    let records = state
        .attendance_service
        .roster(EventId::new(event_id))
        .await?;

    let entries: Vec<RosterEntryDto> = records.into_iter().map(RosterEntryDto::from).collect();
    let checked_in = entries
        .iter()
        .filter(|e| e.state == AttendanceState::CheckedIn)
        .count();

    Ok(Json(RosterResponse {
        event_id,
        registered: entries.len(),
        checked_in,
        entries,
    }))
}

/// Attendance routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/{event_id}/token", post(issue_token))
        .route("/attendance/check-in", post(check_in))
        .route("/events/{event_id}/attendance", get(roster))
}
