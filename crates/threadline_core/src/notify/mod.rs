//! Notification events emitted when comments are created.
//!
//! # Responsibility
//! - Shape one event payload per host type.
//! - Define the sink contract and a transactional SQLite outbox.
//!
//! # Invariants
//! - Exactly one event is emitted per successful comment creation.
//! - `commenters` equals the involved-party set of the host.

pub mod event;
pub mod sink;
