//! Event service: the event registry and student registration.

use std::sync::Arc;

use crate::domain::{AttendanceRecord, Event, EventDraft, EventId, UserId};
use crate::error::ApiError;
use crate::persistence::{AttendanceStore, EventFilter};

/// Administers events and registers students for them.
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<dyn AttendanceStore>,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(store: Arc<dyn AttendanceStore>) -> Self {
        Self { store }
    }

    /// Creates an event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the title or location is
    /// blank, or a persistence error.
    pub async fn create_event(&self, draft: EventDraft) -> Result<Event, ApiError> {
        let draft = validate_draft(draft)?;
        let event = self.store.insert_event(draft).await?;
        tracing::info!(event_id = %event.id, title = %event.title, "event created");
        Ok(event)
    }

    /// Replaces every editable field of an event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] on a blank title or location,
    /// [`ApiError::EventNotFound`] if the event does not exist, or a
    /// persistence error.
    pub async fn update_event(
        &self,
        event_id: EventId,
        draft: EventDraft,
    ) -> Result<Event, ApiError> {
        let draft = validate_draft(draft)?;
        let event = self
            .store
            .update_event(event_id, draft)
            .await?
            .ok_or(ApiError::EventNotFound(event_id))?;
        tracing::info!(%event_id, status = %event.status, "event updated");
        Ok(event)
    }

    /// Fetches one event.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event does not exist, or a
    /// persistence error.
    pub async fn get_event(&self, event_id: EventId) -> Result<Event, ApiError> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or(ApiError::EventNotFound(event_id))
    }

    /// Deletes an event that nobody has registered for.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::EventNotFound`] if the event does not exist,
    /// [`ApiError::EventInUse`] if attendance records reference it, or a
    /// persistence error.
    pub async fn delete_event(&self, event_id: EventId) -> Result<(), ApiError> {
        if !self.store.delete_event(event_id).await? {
            return Err(ApiError::EventNotFound(event_id));
        }
        tracing::info!(%event_id, "event deleted");
        Ok(())
    }

    /// Active events that have not started yet, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn list_upcoming(&self) -> Result<Vec<Event>, ApiError> {
        Ok(self.store.list_events(EventFilter::Upcoming).await?)
    }

    /// Every event, newest first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn list_all(&self) -> Result<Vec<Event>, ApiError> {
        Ok(self.store.list_events(EventFilter::All).await?)
    }

    /// Registers `user_id` for an active event.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ActiveEventNotFound`] if the event is missing or not
    ///   active.
    /// - [`ApiError::AlreadyRegistered`] on a duplicate registration.
    /// - [`ApiError::EventFull`] if the event has reached its capacity.
    pub async fn register(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<AttendanceRecord, ApiError> {
        let event = match self.store.get_event(event_id).await? {
            Some(event) if event.is_active() => event,
            _ => return Err(ApiError::ActiveEventNotFound(event_id)),
        };

        if self.store.get_record(event_id, user_id).await?.is_some() {
            return Err(ApiError::AlreadyRegistered(event_id));
        }

        let registered = self.store.count_registrations(event_id).await?;
        if event.is_full(registered) {
            return Err(ApiError::EventFull(event_id));
        }

        let record = self.store.insert_registration(event_id, user_id).await?;
        tracing::info!(%event_id, %user_id, "registered for event");
        Ok(record)
    }

    /// Events `user_id` has registered for.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn registrations_of(&self, user_id: UserId) -> Result<Vec<EventId>, ApiError> {
        Ok(self.store.registered_event_ids(user_id).await?)
    }
}

fn validate_draft(mut draft: EventDraft) -> Result<EventDraft, ApiError> {
    draft.title = draft.title.trim().to_string();
    draft.location = draft.location.trim().to_string();
    if draft.title.is_empty() {
        return Err(ApiError::InvalidRequest("title is required".to_string()));
    }
    if draft.location.is_empty() {
        return Err(ApiError::InvalidRequest("location is required".to_string()));
    }
    Ok(draft)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::EventStatus;
    use crate::persistence::MemoryStore;
    use chrono::{Duration, Utc};

    fn service() -> EventService {
        EventService::new(Arc::new(MemoryStore::new()))
    }

    fn draft(status: EventStatus, max_capacity: u32) -> EventDraft {
        EventDraft {
            title: "  Hackathon ".to_string(),
            description: Some("24 hours".to_string()),
            starts_at: Utc::now() + Duration::days(3),
            location: "Lab 2".to_string(),
            organizer: Some("CS club".to_string()),
            status,
            max_capacity,
        }
    }

    async fn create(service: &EventService, status: EventStatus, max_capacity: u32) -> Event {
        let Ok(event) = service.create_event(draft(status, max_capacity)).await else {
            panic!("create_event failed");
        };
        event
    }

    #[tokio::test]
    async fn create_trims_and_stores() {
        let service = service();
        let event = create(&service, EventStatus::Active, 0).await;
        assert_eq!(event.title, "Hackathon");

        let Ok(fetched) = service.get_event(event.id).await else {
            panic!("get_event failed");
        };
        assert_eq!(fetched, event);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let service = service();
        let mut d = draft(EventStatus::Active, 0);
        d.title = "   ".to_string();
        let result = service.create_event(d).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn update_changes_status() {
        let service = service();
        let event = create(&service, EventStatus::Active, 0).await;

        let result = service
            .update_event(event.id, draft(EventStatus::Completed, 0))
            .await;
        let Ok(updated) = result else {
            panic!("update failed");
        };
        assert_eq!(updated.status, EventStatus::Completed);

        let missing = service
            .update_event(EventId::new(999), draft(EventStatus::Active, 0))
            .await;
        assert!(matches!(missing, Err(ApiError::EventNotFound(_))));
    }

    #[tokio::test]
    async fn delete_refuses_events_with_registrations() {
        let service = service();
        let empty = create(&service, EventStatus::Active, 0).await;
        let attended = create(&service, EventStatus::Active, 0).await;
        let _ = service.register(attended.id, UserId::new(3)).await;

        assert!(service.delete_event(empty.id).await.is_ok());
        assert!(matches!(
            service.get_event(empty.id).await,
            Err(ApiError::EventNotFound(_))
        ));
        assert!(matches!(
            service.delete_event(empty.id).await,
            Err(ApiError::EventNotFound(_))
        ));
        assert!(matches!(
            service.delete_event(attended.id).await,
            Err(ApiError::EventInUse(_))
        ));
    }

    #[tokio::test]
    async fn upcoming_excludes_inactive() {
        let service = service();
        let _ = create(&service, EventStatus::Active, 0).await;
        let _ = create(&service, EventStatus::Tba, 0).await;

        let Ok(upcoming) = service.list_upcoming().await else {
            panic!("list failed");
        };
        assert_eq!(upcoming.len(), 1);

        let Ok(all) = service.list_all().await else {
            panic!("list failed");
        };
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn register_once_per_user() {
        let service = service();
        let event = create(&service, EventStatus::Active, 0).await;
        let user = UserId::new(5);

        assert!(service.register(event.id, user).await.is_ok());
        let again = service.register(event.id, user).await;
        assert!(matches!(again, Err(ApiError::AlreadyRegistered(_))));

        let Ok(ids) = service.registrations_of(user).await else {
            panic!("registrations_of failed");
        };
        assert_eq!(ids, vec![event.id]);
    }

    #[tokio::test]
    async fn register_requires_active_event() {
        let service = service();
        let event = create(&service, EventStatus::Cancelled, 0).await;
        let result = service.register(event.id, UserId::new(1)).await;
        assert!(matches!(result, Err(ApiError::ActiveEventNotFound(_))));
    }

    #[tokio::test]
    async fn register_respects_capacity() {
        let service = service();
        let event = create(&service, EventStatus::Active, 1).await;

        assert!(service.register(event.id, UserId::new(1)).await.is_ok());
        let full = service.register(event.id, UserId::new(2)).await;
        assert!(matches!(full, Err(ApiError::EventFull(_))));
    }
}
