//! Service layer: business logic orchestration.

pub mod attendance_service;
pub mod event_service;

pub use attendance_service::{AttendanceService, CheckInReceipt, IssuedToken};
pub use event_service::EventService;
