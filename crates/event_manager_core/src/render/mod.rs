//! HTML fragments for listings, event pages and the admin details box.
//!
//! # Responsibility
//! - Turn already-loaded data into markup; no storage access, no globals.
//!
//! # Invariants
//! - Every interpolated value is HTML-escaped by the template engine.
//! - An empty listing renders a placeholder paragraph, never an empty container.
//! - The RSVP form is only attached to the primary detail render of a
//!   published event.

mod admin;
mod detail;
mod listing;

pub use admin::{admin_column_value, render_event_details_box};
pub use detail::{append_rsvp_form, render_event_detail, render_rsvp_form, RenderTarget};
pub use listing::{render_event_list, ListingItem, NO_EVENTS_MARKUP};

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub struct RenderError(askama::Error);

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "template rendering failed: {}", self.0)
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl From<askama::Error> for RenderError {
    fn from(value: askama::Error) -> Self {
        Self(value)
    }
}
