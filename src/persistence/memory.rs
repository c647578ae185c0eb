//! In-memory store guarded by `tokio::sync::RwLock`.
//!
//! Each table is a separate lock. The check-in compare-and-set holds the
//! ledger write lock across the read and the write, so racing check-ins for
//! the same row are serialized and only the first one succeeds.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use super::{AttendanceStore, EventFilter, StoreError};
use crate::domain::{
    AttendanceRecord, AttendanceToken, Clock, Event, EventDraft, EventId, SystemClock, UserId,
};

/// Process-local [`AttendanceStore`].
#[derive(Debug)]
pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    next_event_id: AtomicI64,
    events: RwLock<BTreeMap<EventId, Event>>,
    tokens: RwLock<HashMap<EventId, AttendanceToken>>,
    ledger: RwLock<BTreeMap<(EventId, UserId), AttendanceRecord>>,
}

impl MemoryStore {
    /// Creates an empty store that reads wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store that reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            next_event_id: AtomicI64::new(1),
            events: RwLock::new(BTreeMap::new()),
            tokens: RwLock::new(HashMap::new()),
            ledger: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AttendanceStore for MemoryStore {
    async fn insert_event(&self, draft: EventDraft) -> Result<Event, StoreError> {
        let id = EventId::new(self.next_event_id.fetch_add(1, Ordering::Relaxed));
        let event = Event::from_draft(id, draft);
        self.events.write().await.insert(id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().await.get(&event_id).cloned())
    }

    async fn update_event(
        &self,
        event_id: EventId,
        draft: EventDraft,
    ) -> Result<Option<Event>, StoreError> {
        let mut events = self.events.write().await;
        let Some(slot) = events.get_mut(&event_id) else {
            return Ok(None);
        };
        *slot = Event::from_draft(event_id, draft);
        Ok(Some(slot.clone()))
    }

    async fn list_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let now = self.clock.now();
        let events = self.events.read().await;
        let mut out: Vec<Event> = match filter {
            EventFilter::All => events.values().cloned().collect(),
            EventFilter::Upcoming => events
                .values()
                .filter(|e| e.is_active() && e.starts_at >= now)
                .cloned()
                .collect(),
        };
        match filter {
            EventFilter::All => out.sort_by(|a, b| b.starts_at.cmp(&a.starts_at)),
            EventFilter::Upcoming => out.sort_by(|a, b| a.starts_at.cmp(&b.starts_at)),
        }
        Ok(out)
    }

    async fn delete_event(&self, event_id: EventId) -> Result<bool, StoreError> {
        // Lock order: events, tokens, ledger.
        let mut events = self.events.write().await;
        if !events.contains_key(&event_id) {
            return Ok(false);
        }
        let mut tokens = self.tokens.write().await;
        let ledger = self.ledger.read().await;
        if ledger.keys().any(|(e, _)| *e == event_id) {
            return Err(StoreError::EventInUse(event_id));
        }
        tokens.remove(&event_id);
        events.remove(&event_id);
        Ok(true)
    }

    async fn replace_token(
        &self,
        event_id: EventId,
        secret: String,
        validity: Duration,
    ) -> Result<AttendanceToken, StoreError> {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(validity)
            .ok_or_else(|| StoreError::TimeOutOfRange(format!("token expiry for event {event_id}")))?;
        let token = AttendanceToken {
            event_id,
            secret,
            expires_at,
        };
        self.tokens.write().await.insert(event_id, token.clone());
        Ok(token)
    }

    async fn find_live_token(
        &self,
        event_id: EventId,
        secret: &str,
    ) -> Result<Option<AttendanceToken>, StoreError> {
        let now = self.clock.now();
        let tokens = self.tokens.read().await;
        Ok(tokens
            .get(&event_id)
            .filter(|t| t.admits(event_id, secret, now))
            .cloned())
    }

    async fn insert_registration(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<AttendanceRecord, StoreError> {
        if !self.events.read().await.contains_key(&event_id) {
            return Err(StoreError::EventNotFound(event_id));
        }
        let mut ledger = self.ledger.write().await;
        if ledger.contains_key(&(event_id, user_id)) {
            return Err(StoreError::DuplicateRegistration { event_id, user_id });
        }
        let record = AttendanceRecord::registered(event_id, user_id, self.clock.now());
        ledger.insert((event_id, user_id), record.clone());
        Ok(record)
    }

    async fn get_record(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self.ledger.read().await.get(&(event_id, user_id)).cloned())
    }

    async fn mark_checked_in(
        &self,
        event_id: EventId,
        user_id: UserId,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let mut ledger = self.ledger.write().await;
        match ledger.get_mut(&(event_id, user_id)) {
            Some(record) if record.checked_in_at.is_none() => {
                let now = self.clock.now();
                record.checked_in_at = Some(now);
                Ok(Some(now))
            }
            _ => Ok(None),
        }
    }

    async fn count_registrations(&self, event_id: EventId) -> Result<u64, StoreError> {
        let ledger = self.ledger.read().await;
        Ok(ledger.keys().filter(|(e, _)| *e == event_id).count() as u64)
    }

    async fn list_records(&self, event_id: EventId) -> Result<Vec<AttendanceRecord>, StoreError> {
        let ledger = self.ledger.read().await;
        let mut out: Vec<AttendanceRecord> = ledger
            .values()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then(a.user_id.cmp(&b.user_id))
        });
        Ok(out)
    }

    async fn registered_event_ids(&self, user_id: UserId) -> Result<Vec<EventId>, StoreError> {
        let ledger = self.ledger.read().await;
        Ok(ledger
            .keys()
            .filter(|(_, u)| *u == user_id)
            .map(|(e, _)| *e)
            .collect())
    }
}
