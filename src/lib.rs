//! # campus-checkin
//!
//! REST API for student-organization events with QR-token attendance
//! check-in.
//!
//! An administrator issues a short-lived token for an active event and
//! shows it as a QR code. Registered students scan it and submit the token;
//! the service advances their attendance record from registered to checked
//! in, at most once.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP) + identity headers from the auth proxy
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── AttendanceService, EventService (service/)
//!     │
//!     ├── AttendanceStore trait (persistence/)
//!     │     ├── MemoryStore
//!     │     └── PostgresStore
//!     │
//!     └── Domain model (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
