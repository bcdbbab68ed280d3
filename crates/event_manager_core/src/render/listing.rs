//! Event listing fragment for the `event_list` directive.

use crate::model::event::Event;
use crate::render::RenderError;
use askama::Template;

/// Fallback markup for an empty listing.
pub const NO_EVENTS_MARKUP: &str = "<p>No events found.</p>";

/// One row of the event listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    pub title: String,
    pub link: String,
    /// `YYYY-MM-DD`, or empty.
    pub date: String,
    /// Empty when the event has no location.
    pub location: String,
}

impl ListingItem {
    pub fn from_event(event: &Event, link: impl Into<String>) -> Self {
        Self {
            title: event.title.clone(),
            link: link.into(),
            date: event.date_text(),
            location: event.location_text().to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "event_list.html")]
struct EventListTemplate {
    items: Vec<ListingItem>,
}

/// Renders the listing fragment, or the "no events" placeholder when empty.
pub fn render_event_list(items: Vec<ListingItem>) -> Result<String, RenderError> {
    Ok(EventListTemplate { items }.render()?)
}

#[cfg(test)]
mod tests {
    use super::{render_event_list, ListingItem, NO_EVENTS_MARKUP};

    fn item(title: &str, date: &str, location: &str) -> ListingItem {
        ListingItem {
            title: title.to_string(),
            link: "https://example.com/events/42/".to_string(),
            date: date.to_string(),
            location: location.to_string(),
        }
    }

    #[test]
    fn empty_listing_renders_placeholder_only() {
        let html = render_event_list(Vec::new()).unwrap();
        assert_eq!(html.trim(), NO_EVENTS_MARKUP);
        assert!(!html.contains("em-event-list"));
    }

    #[test]
    fn listing_renders_one_item_per_event_with_optional_lines() {
        let html = render_event_list(vec![
            item("Spring Fair", "2026-04-15", "Hyderabad"),
            item("Book Club", "", ""),
        ])
        .unwrap();

        assert!(html.contains("class=\"em-event-list\""));
        assert_eq!(html.matches("class=\"em-event-item\"").count(), 2);
        assert!(html.contains("Spring Fair</a></h3>"));
        assert!(html.contains("<strong>Date:</strong> 2026-04-15"));
        assert!(html.contains("<strong>Location:</strong> Hyderabad"));
        assert_eq!(html.matches("<strong>Date:</strong>").count(), 1);
        assert_eq!(html.matches("<strong>Location:</strong>").count(), 1);
        assert!(!html.contains(NO_EVENTS_MARKUP));
    }

    #[test]
    fn listing_escapes_titles() {
        let html = render_event_list(vec![item("<script>alert(1)</script>", "", "")]).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
