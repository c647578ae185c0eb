//! Data Transfer Objects for REST request/response serialization.
//!
//! Identifiers cross the wire as plain integers.

pub mod attendance_dto;
pub mod event_dto;

pub use attendance_dto::*;
pub use event_dto::*;
