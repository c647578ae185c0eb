//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::AttendanceStore;
use crate::service::{AttendanceService, EventService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Token issuance and check-in.
    pub attendance_service: Arc<AttendanceService>,
    /// Event registry and registration.
    pub event_service: Arc<EventService>,
}

impl AppState {
    /// Builds both services over one store.
    #[must_use]
    pub fn new(store: Arc<dyn AttendanceStore>, token_validity: chrono::Duration) -> Self {
        Self {
            attendance_service: Arc::new(AttendanceService::new(
                Arc::clone(&store),
                token_validity,
            )),
            event_service: Arc::new(EventService::new(store)),
        }
    }
}
