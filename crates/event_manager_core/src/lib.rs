//! Core domain logic for the event manager.
//! This crate is the single source of truth for event, category and RSVP invariants.

pub mod app;
pub mod clock;
pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod notify;
pub mod registry;
pub mod render;
pub mod repo;
pub mod rest;
pub mod sanitize;
pub mod service;
pub mod token;

pub use app::{AppError, AppResult, DetailsOutcome, DetailsRejection, EventManager, LifecycleResult};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, LoggingConfig, SiteConfig};
pub use form::{EventDetailsForm, RsvpForm};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::attendee::{Attendee, AttendeeValidationError, NewAttendee};
pub use model::category::{Category, CategoryId, NewCategory};
pub use model::event::{Event, EventDate, EventId, EventStatus, EventValidationError, StatusChange};
pub use notify::{MailMessage, Mailer, MemoryMailer, NotificationOutcome};
pub use registry::ContentRegistry;
pub use render::RenderTarget;
pub use repo::{RepoError, RepoResult};
pub use rest::EventResource;
pub use service::listing_service::ListingParams;
pub use service::rsvp_service::{RsvpOutcome, RsvpRejection};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
