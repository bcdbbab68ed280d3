//! Event lifecycle use-cases.
//!
//! # Responsibility
//! - Create events and move them through publication statuses.
//! - Apply "Event Details" edits (date, location) with lenient input rules.
//!
//! # Invariants
//! - Every status write reports a [`StatusChange`] so callers can react to
//!   publication exactly once.
//! - A malformed date edit never overwrites the stored date.

use crate::model::event::{Event, EventDate, EventId, EventStatus, StatusChange};
use crate::repo::event_repo::EventRepository;
use crate::repo::{RepoError, RepoResult};
use crate::sanitize::sanitize_optional_text;
use log::{info, warn};

/// Raw "Event Details" values; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDetailsInput {
    pub date: Option<String>,
    pub location: Option<String>,
}

/// Use-case service wrapper for event lifecycle operations.
pub struct EventService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new event and reports its initial status as a change from nothing.
    pub fn create_event(&self, event: &Event) -> RepoResult<(Event, StatusChange)> {
        let id = self.repo.create_event(event)?;
        let stored = self.require_event(id)?;
        info!(
            "event=event_create module=service status=ok event_id={} event_status={}",
            id, stored.status
        );
        let change = StatusChange {
            event_id: id,
            previous: None,
            current: stored.status,
        };
        Ok((stored, change))
    }

    /// Writes a new status and returns the stored event with the change it caused.
    pub fn set_status(&self, id: EventId, status: EventStatus) -> RepoResult<(Event, StatusChange)> {
        let change = self.repo.set_status(id, status)?;
        let stored = self.require_event(id)?;
        info!(
            "event=event_status module=service status=ok event_id={} from={} to={}",
            id,
            change.previous.map_or("none", EventStatus::as_str),
            change.current
        );
        Ok((stored, change))
    }

    /// Applies "Event Details" edits.
    ///
    /// - `date`: empty clears, a valid `YYYY-MM-DD` sets, anything else is ignored.
    /// - `location`: sanitized; empty clears.
    pub fn save_details(&self, id: EventId, input: &EventDetailsInput) -> RepoResult<Event> {
        let mut event = self.require_event(id)?;

        if let Some(raw) = input.date.as_deref() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                event.date = None;
            } else {
                match EventDate::parse(trimmed) {
                    Ok(date) => event.date = Some(date),
                    Err(err) => warn!(
                        "event=event_details module=service status=skip event_id={} field=event_date error={}",
                        id, err
                    ),
                }
            }
        }

        if let Some(raw) = input.location.as_deref() {
            event.location = sanitize_optional_text(raw);
        }

        self.repo.update_event(&event)?;
        self.require_event(id)
    }

    pub fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        self.repo.get_event(id)
    }

    fn require_event(&self, id: EventId) -> RepoResult<Event> {
        self.repo.get_event(id)?.ok_or(RepoError::NotFound(id))
    }
}
