//! Event listing query and filter normalization.
//!
//! # Responsibility
//! - Turn loosely-typed embed directive attributes into a [`ListingParams`].
//! - Run the published-only listing query with category and upcoming filters.
//!
//! # Invariants
//! - Malformed input degrades to defaults; normalization never fails.
//! - Only `publish` events are returned.
//! - Upcoming listings exclude undated events, keep dates on or after today
//!   and sort by ascending date.

use crate::model::event::{Event, EventStatus};
use crate::repo::event_repo::{EventListQuery, EventOrder, EventRepository};
use crate::repo::RepoResult;
use crate::sanitize::sanitize_text;
use chrono::NaiveDate;

pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 100;

pub const ATTR_POSTS_PER_PAGE: &str = "posts_per_page";
pub const ATTR_EVENT_TYPE: &str = "event_type";
pub const ATTR_UPCOMING: &str = "upcoming";

/// Normalized listing filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParams {
    page_size: u32,
    category_slug: Option<String>,
    upcoming_only: bool,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            category_slug: None,
            upcoming_only: false,
        }
    }
}

impl ListingParams {
    pub fn new(page_size: i64, category_slug: Option<&str>, upcoming_only: bool) -> Self {
        Self {
            page_size: clamp_page_size(page_size),
            category_slug: category_slug.and_then(normalize_category_slug),
            upcoming_only,
        }
    }

    /// Builds params from embed directive attributes. Unknown keys are ignored
    /// and later duplicates win.
    pub fn from_attributes<'a>(attributes: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut params = Self::default();
        for (key, value) in attributes {
            match key.trim() {
                ATTR_POSTS_PER_PAGE => params.page_size = normalize_page_size(value),
                ATTR_EVENT_TYPE => params.category_slug = normalize_category_slug(value),
                ATTR_UPCOMING => params.upcoming_only = parse_upcoming(value),
                _ => {}
            }
        }
        params
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn category_slug(&self) -> Option<&str> {
        self.category_slug.as_deref()
    }

    pub fn upcoming_only(&self) -> bool {
        self.upcoming_only
    }

    /// Storage query for these params on `today`.
    pub fn to_query(&self, today: NaiveDate) -> EventListQuery {
        EventListQuery {
            status: Some(EventStatus::Publish),
            category_slug: self.category_slug.clone(),
            dated_on_or_after: self.upcoming_only.then_some(today),
            order: if self.upcoming_only {
                EventOrder::DateAscending
            } else {
                EventOrder::NewestFirst
            },
            limit: Some(self.page_size),
        }
    }
}

/// Parses a page size attribute; non-numeric or non-positive input yields the default.
pub fn normalize_page_size(raw: &str) -> u32 {
    raw.trim()
        .parse::<i64>()
        .map(clamp_page_size)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

fn clamp_page_size(value: i64) -> u32 {
    if value <= 0 {
        return DEFAULT_PAGE_SIZE;
    }
    u32::try_from(value)
        .unwrap_or(MAX_PAGE_SIZE)
        .min(MAX_PAGE_SIZE)
}

/// Only the literal `true` enables the upcoming filter.
pub fn parse_upcoming(raw: &str) -> bool {
    raw.trim() == "true"
}

/// Sanitizes a category slug attribute; blank means "no filter".
pub fn normalize_category_slug(raw: &str) -> Option<String> {
    let slug = sanitize_text(raw).to_ascii_lowercase();
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

/// Listing use-case over an event repository.
pub struct ListingService<R: EventRepository> {
    repo: R,
}

impl<R: EventRepository> ListingService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns one page of published events matching `params`.
    pub fn list_events(&self, params: &ListingParams, today: NaiveDate) -> RepoResult<Vec<Event>> {
        self.repo.list_events(&params.to_query(today))
    }
}
