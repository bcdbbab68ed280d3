//! Content schema for events, their categories and recorded RSVPs.
//!
//! # Responsibility
//! - Define canonical data structures used by listing, RSVP and notification code.
//! - Validate entity-level invariants before anything reaches storage.
//!
//! # Invariants
//! - Every event is identified by a stable `EventId`.
//! - Attendees are append-only; no type exposes mutation after recording.

pub mod attendee;
pub mod category;
pub mod event;
