//! RSVP attendee records.
//!
//! # Invariants
//! - `name` is sanitized and non-empty.
//! - `email` matches basic email syntax.
//! - `submitted_at` is assigned by storage, never by the visitor.

use crate::model::event::EventId;
use crate::sanitize::{sanitize_email, sanitize_text};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One recorded RSVP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Storage sequence; ascending order is RSVP order.
    pub id: i64,
    pub event_id: EventId,
    pub name: String,
    pub email: String,
    /// Unix epoch milliseconds.
    pub submitted_at: i64,
}

/// Visitor-supplied RSVP fields after sanitizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendee {
    name: String,
    email: String,
}

impl NewAttendee {
    /// Sanitizes raw form values and validates them.
    pub fn parse(name: &str, email: &str) -> Result<Self, AttendeeValidationError> {
        let name = sanitize_text(name);
        if name.is_empty() {
            return Err(AttendeeValidationError::EmptyName);
        }
        let email = sanitize_email(email).ok_or(AttendeeValidationError::InvalidEmail)?;
        Ok(Self { name, email })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendeeValidationError {
    EmptyName,
    InvalidEmail,
}

impl Display for AttendeeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "attendee name cannot be empty"),
            Self::InvalidEmail => write!(f, "attendee email is not a valid address"),
        }
    }
}

impl Error for AttendeeValidationError {}

#[cfg(test)]
mod tests {
    use super::{AttendeeValidationError, NewAttendee};

    #[test]
    fn parse_sanitizes_name_and_trims_email() {
        let attendee = NewAttendee::parse("  <b>Asha</b> ", " asha@example.com ").unwrap();
        assert_eq!(attendee.name(), "Asha");
        assert_eq!(attendee.email(), "asha@example.com");
    }

    #[test]
    fn parse_rejects_blank_name_before_email() {
        assert_eq!(
            NewAttendee::parse("   ", "not-an-email"),
            Err(AttendeeValidationError::EmptyName)
        );
        assert_eq!(
            NewAttendee::parse("Asha", "not-an-email"),
            Err(AttendeeValidationError::InvalidEmail)
        );
    }
}
