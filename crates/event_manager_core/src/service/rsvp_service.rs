//! RSVP use-case.
//!
//! # Invariants
//! - Invalid submissions are reported as [`RsvpOutcome::Ignored`] and write nothing.
//! - Storage failures are the only errors that propagate.

use crate::model::attendee::{Attendee, AttendeeValidationError, NewAttendee};
use crate::model::event::EventId;
use crate::repo::attendee_repo::AttendeeRepository;
use crate::repo::{RepoError, RepoResult};
use log::{debug, info};
use std::fmt::{Display, Formatter};

/// Why a submission was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpRejection {
    MissingSubmitMarker,
    InvalidToken,
    /// No published event has the target id.
    EventNotFound,
    EmptyName,
    InvalidEmail,
    StorageUnavailable,
}

impl RsvpRejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingSubmitMarker => "missing_submit_marker",
            Self::InvalidToken => "invalid_token",
            Self::EventNotFound => "event_not_found",
            Self::EmptyName => "empty_name",
            Self::InvalidEmail => "invalid_email",
            Self::StorageUnavailable => "storage_unavailable",
        }
    }
}

impl Display for RsvpRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AttendeeValidationError> for RsvpRejection {
    fn from(value: AttendeeValidationError) -> Self {
        match value {
            AttendeeValidationError::EmptyName => Self::EmptyName,
            AttendeeValidationError::InvalidEmail => Self::InvalidEmail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsvpOutcome {
    Recorded(Attendee),
    Ignored(RsvpRejection),
}

impl RsvpOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded(_))
    }
}

pub struct RsvpService<R: AttendeeRepository> {
    repo: R,
}

impl<R: AttendeeRepository> RsvpService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates raw form values and appends one attendee.
    pub fn submit(&self, event_id: EventId, name: &str, email: &str) -> RepoResult<RsvpOutcome> {
        let attendee = match NewAttendee::parse(name, email) {
            Ok(attendee) => attendee,
            Err(err) => return Ok(ignored(event_id, err.into())),
        };

        match self.repo.append_attendee(event_id, &attendee) {
            Ok(recorded) => {
                info!(
                    "event=rsvp_submit module=service status=ok event_id={} attendee_id={}",
                    event_id, recorded.id
                );
                Ok(RsvpOutcome::Recorded(recorded))
            }
            Err(RepoError::NotFound(_)) => Ok(ignored(event_id, RsvpRejection::EventNotFound)),
            Err(err) => Err(err),
        }
    }

    pub fn attendees(&self, event_id: EventId) -> RepoResult<Vec<Attendee>> {
        self.repo.list_attendees(event_id)
    }

    pub fn attendee_count(&self, event_id: EventId) -> RepoResult<u64> {
        self.repo.attendee_count(event_id)
    }
}

pub(crate) fn ignored(event_id: EventId, reason: RsvpRejection) -> RsvpOutcome {
    debug!(
        "event=rsvp_submit module=service status=skip event_id={} reason={}",
        event_id, reason
    );
    RsvpOutcome::Ignored(reason)
}
