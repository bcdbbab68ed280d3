//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical event record and its publication lifecycle.
//! - Parse and validate the date-only `YYYY-MM-DD` event date.
//!
//! # Invariants
//! - `id` is stable and never reused for another event.
//! - `title` is non-empty after trimming.
//! - `date`, when set, is a real calendar date.
//! - `location`, when set, is non-empty.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every event.
pub type EventId = Uuid;

const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";

fn has_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Publication status mirrored from the content lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Saved but not visible to visitors.
    Draft,
    /// Awaiting editorial review.
    Pending,
    /// Scheduled for later publication.
    Future,
    /// Visible only to operators.
    Private,
    /// Visible to visitors; the only status listings and RSVPs accept.
    Publish,
    /// Moved to trash.
    Trash,
}

impl EventStatus {
    pub const ALL: [EventStatus; 6] = [
        Self::Draft,
        Self::Pending,
        Self::Future,
        Self::Private,
        Self::Publish,
        Self::Trash,
    ];

    /// Returns the storage/wire spelling of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Future => "future",
            Self::Private => "private",
            Self::Publish => "publish",
            Self::Trash => "trash",
        }
    }

    /// Parses the storage/wire spelling. `published` is accepted as an alias.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized == "published" {
            return Some(Self::Publish);
        }
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
    }

    pub fn is_published(self) -> bool {
        self == Self::Publish
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar date of an event, without time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventDate(NaiveDate);

impl EventDate {
    /// Parses a strict `YYYY-MM-DD` value.
    pub fn parse(value: &str) -> Result<Self, EventValidationError> {
        let trimmed = value.trim();
        // chrono accepts unpadded fields and signed years; storage ordering
        // relies on the fixed `dddd-dd-dd` shape.
        if !has_date_shape(trimmed) {
            return Err(EventValidationError::InvalidDate(trimmed.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, EVENT_DATE_FORMAT)
            .map(Self)
            .map_err(|_| EventValidationError::InvalidDate(trimmed.to_string()))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Returns whether this date is on or after `today`.
    pub fn is_on_or_after(&self, today: NaiveDate) -> bool {
        self.0 >= today
    }
}

impl Display for EventDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(EVENT_DATE_FORMAT))
    }
}

impl TryFrom<String> for EventDate {
    type Error = EventValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EventDate> for String {
    fn from(value: EventDate) -> Self {
        value.to_string()
    }
}

/// Canonical event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// Body text supplied by editors.
    pub content: String,
    pub status: EventStatus,
    pub date: Option<EventDate>,
    pub location: Option<String>,
    /// Unix epoch milliseconds, assigned by storage.
    pub created_at: i64,
    /// Unix epoch milliseconds, assigned by storage.
    pub updated_at: i64,
}

impl Event {
    /// Creates a new draft event with a generated stable ID.
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title)
    }

    /// Creates a new draft event with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(id: EventId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            status: EventStatus::Draft,
            date: None,
            location: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Validates entity-level invariants.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }
        if let Some(location) = self.location.as_deref() {
            if location.trim().is_empty() {
                return Err(EventValidationError::EmptyLocation);
            }
        }
        Ok(())
    }

    pub fn is_published(&self) -> bool {
        self.status.is_published()
    }

    /// Date rendered as `YYYY-MM-DD`, or empty when absent.
    pub fn date_text(&self) -> String {
        self.date.map(|date| date.to_string()).unwrap_or_default()
    }

    /// Location text, or empty when absent.
    pub fn location_text(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }
}

/// Validation errors for event invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyTitle,
    EmptyLocation,
    InvalidDate(String),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title cannot be empty"),
            Self::EmptyLocation => write!(f, "event location cannot be blank when set"),
            Self::InvalidDate(value) => {
                write!(f, "event date `{value}` is not a valid YYYY-MM-DD date")
            }
        }
    }
}

impl Error for EventValidationError {}

/// Status before and after one lifecycle write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub event_id: EventId,
    /// `None` when the event was created by this write.
    pub previous: Option<EventStatus>,
    pub current: EventStatus,
}

impl StatusChange {
    /// Returns whether this write moved the event into `publish` from any other state.
    pub fn is_publication(&self) -> bool {
        self.current.is_published() && self.previous != Some(EventStatus::Publish)
    }
}
