//! Event handlers: create, update, delete, list, get, register.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{EventDto, EventRequest, RegistrationResponse};
use crate::api::identity::{Identity, Role};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ApiError, ErrorResponse};

/// `POST /events` — Create an event.
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not an admin or the body is invalid.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates an event. Status defaults to `active` and capacity to unlimited. Admin only.",
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 400, description = "Invalid event", body = ErrorResponse),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    identity.require(Role::Admin)?;

    let event = state.event_service.create_event(req.into()).await?;

    Ok((StatusCode::CREATED, Json(EventDto::from(event))))
}

/// `PUT /events/{event_id}` — Replace an event's editable fields.
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not an admin, the body is invalid,
/// or the event does not exist.
#[utoipa::path(
    put,
    path = "/api/v1/events/{event_id}",
    tag = "Events",
    summary = "Update an event",
    description = "Replaces title, description, date, location, organizer, status, and capacity. Admin only.",
    params(
        ("event_id" = i64, Path, description = "Event ID"),
    ),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventDto),
        (status = 400, description = "Invalid event", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    identity: Identity,
    Path(event_id): Path<i64>,
    Json(req): Json<EventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    identity.require(Role::Admin)?;

    let event = state
        .event_service
        .update_event(EventId::new(event_id), req.into())
        .await?;

    Ok(Json(EventDto::from(event)))
}

/// `DELETE /events/{event_id}` — Delete an event without attendance records.
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not an admin, the event does not
/// exist, or attendance records reference it.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}",
    tag = "Events",
    summary = "Delete an event",
    description = "Deletes an event and its token. Refused while any registration references the event. Admin only.",
    params(
        ("event_id" = i64, Path, description = "Event ID"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event has attendance records", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    identity: Identity,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    identity.require(Role::Admin)?;

    state
        .event_service
        .delete_event(EventId::new(event_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /events` — Active upcoming events.
///
/// # Errors
///
/// Returns [`ApiError`] on persistence failures.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List upcoming events",
    description = "Returns active events that have not started yet, soonest first.",
    responses(
        (status = 200, description = "Upcoming events", body = Vec<EventDto>),
    )
)]
pub async fn list_upcoming(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let events = state.event_service.list_upcoming().await?;
    Ok(Json(
        events.into_iter().map(EventDto::from).collect::<Vec<_>>(),
    ))
}

/// `GET /events/all` — Every event.
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not an admin.
#[utoipa::path(
    get,
    path = "/api/v1/events/all",
    tag = "Events",
    summary = "List all events",
    description = "Returns every event regardless of status, newest first. Admin only.",
    responses(
        (status = 200, description = "All events", body = Vec<EventDto>),
        (status = 403, description = "Caller is not an admin", body = ErrorResponse),
    )
)]
pub async fn list_all(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse, ApiError> {
    identity.require(Role::Admin)?;
    let events = state.event_service.list_all().await?;
    Ok(Json(
        events.into_iter().map(EventDto::from).collect::<Vec<_>>(),
    ))
}

/// `GET /events/{event_id}` — One event.
///
/// # Errors
///
/// Returns [`ApiError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}",
    tag = "Events",
    summary = "Get an event",
    params(
        ("event_id" = i64, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event", body = EventDto),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.event_service.get_event(EventId::new(event_id)).await?;
    Ok(Json(EventDto::from(event)))
}

/// `POST /events/{event_id}/register` — Register the caller for an event.
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not a student, the event is not
/// active, the caller is already registered, or the event is full.
#[utoipa::path(
    post,
    path = "/api/v1/events/{event_id}/register",
    tag = "Events",
    summary = "Register for an event",
    description = "Creates the caller's attendance record in the registered state. Student only.",
    params(
        ("event_id" = i64, Path, description = "Event ID"),
    ),
    responses(
        (status = 201, description = "Registered", body = RegistrationResponse),
        (status = 404, description = "Active event not found", body = ErrorResponse),
        (status = 409, description = "Already registered or event full", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    identity: Identity,
    Path(event_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.require(Role::Student)?;

    let record = state
        .event_service
        .register(EventId::new(event_id), user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(RegistrationResponse::from(record))))
}

/// `GET /events/my-registrations` — IDs of events the caller registered for.
///
/// # Errors
///
/// Returns [`ApiError`] if the caller is not a student.
#[utoipa::path(
    get,
    path = "/api/v1/events/my-registrations",
    tag = "Events",
    summary = "List my registrations",
    responses(
        (status = 200, description = "Registered event IDs", body = Vec<i64>),
        (status = 403, description = "Caller is not a student", body = ErrorResponse),
    )
)]
pub async fn my_registrations(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.require(Role::Student)?;
    let ids = state.event_service.registrations_of(user_id).await?;
    Ok(Json(ids.into_iter().map(EventId::get).collect::<Vec<_>>()))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_upcoming))
        .route("/events/all", get(list_all))
        .route("/events/my-registrations", get(my_registrations))
        .route(
            "/events/{event_id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{event_id}/register", post(register))
}
