//! OpenAPI document for the REST API.

use utoipa::OpenApi;

use super::dto::{
    CheckInRequest, CheckInResponse, EventDto, EventRequest, IssueTokenResponse, RegistrationResponse,
    RosterEntryDto, RosterResponse,
};
use super::handlers::{attendance, event, system};
use crate::domain::{AttendanceState, EventStatus};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "campus-checkin",
        description = "Student-organization events with QR-token attendance check-in."
    ),
    paths(
        attendance::issue_token,
        attendance::check_in,
        attendance::roster,
        event::create_event,
        event::update_event,
        event::delete_event,
        event::list_upcoming,
        event::list_all,
        event::get_event,
        event::register,
        event::my_registrations,
        system::health_handler,
    ),
    components(schemas(
        CheckInRequest,
        CheckInResponse,
        EventDto,
        EventRequest,
        IssueTokenResponse,
        RegistrationResponse,
        RosterEntryDto,
        RosterResponse,
        AttendanceState,
        EventStatus,
        ErrorResponse,
        ErrorBody,
        system::HealthResponse,
    )),
    tags(
        (name = "Attendance", description = "QR tokens and check-in"),
        (name = "Events", description = "Event registry and registration"),
        (name = "System", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_check_in_path() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/attendance/check-in"));
        assert!(doc.paths.paths.contains_key("/api/v1/attendance/{event_id}/token"));
    }
}
