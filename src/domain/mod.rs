//! Domain layer: identifiers, events, attendance tokens, and ledger rows.
//!
//! This module holds the plain data model shared by the persistence and
//! service layers. It performs no I/O.

pub mod attendance;
pub mod clock;
pub mod event;
pub mod ids;
pub mod token;

pub use attendance::{AttendanceRecord, AttendanceState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use event::{Event, EventDraft, EventStatus};
pub use ids::{EventId, UserId};
pub use token::AttendanceToken;
