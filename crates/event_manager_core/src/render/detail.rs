//! Single event page and the RSVP form attached to it.
//!
//! # Invariants
//! - Body content is escaped like every other value; editors' markup is
//!   shown as text.

use crate::model::event::Event;
use crate::render::RenderError;
use askama::Template;

/// Which render of an entry is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    /// The main render of a single event page.
    PrimaryDetail,
    /// An item inside an event listing.
    Listing,
    /// A secondary render of the same content, e.g. an excerpt or widget.
    Embedded,
    SearchResult,
}

#[derive(Template)]
#[template(path = "rsvp_form.html")]
struct RsvpFormTemplate<'a> {
    token: &'a str,
}

#[derive(Template)]
#[template(path = "event_detail.html")]
struct EventDetailTemplate<'a> {
    title: &'a str,
    date: String,
    location: &'a str,
    categories: Vec<String>,
    content: &'a str,
}

/// Renders an empty RSVP form carrying `token`.
pub fn render_rsvp_form(token: &str) -> Result<String, RenderError> {
    Ok(RsvpFormTemplate { token }.render()?)
}

/// Renders the body of a single event page.
pub fn render_event_detail(event: &Event, category_labels: Vec<String>) -> Result<String, RenderError> {
    Ok(EventDetailTemplate {
        title: &event.title,
        date: event.date_text(),
        location: event.location_text(),
        categories: category_labels,
        content: &event.content,
    }
    .render()?)
}

/// Appends the RSVP form to `content` for the primary render of a published event.
///
/// `issue_token` is only called when the form is actually attached.
pub fn append_rsvp_form(
    content: &str,
    event: &Event,
    target: RenderTarget,
    issue_token: impl FnOnce() -> String,
) -> Result<String, RenderError> {
    if target != RenderTarget::PrimaryDetail || !event.is_published() {
        return Ok(content.to_string());
    }

    let form = render_rsvp_form(&issue_token())?;
    Ok(format!("{content}{form}"))
}

#[cfg(test)]
mod tests {
    use super::{append_rsvp_form, render_event_detail, render_rsvp_form, RenderTarget};
    use crate::model::event::{Event, EventDate, EventStatus};

    fn published() -> Event {
        let mut event = Event::new("Spring Fair");
        event.status = EventStatus::Publish;
        event.date = Some(EventDate::parse("2026-04-15").unwrap());
        event.location = Some("Hyderabad".to_string());
        event
    }

    #[test]
    fn rsvp_form_has_required_empty_fields_and_token() {
        let html = render_rsvp_form("abc123").unwrap();
        assert!(html.contains("name=\"em_rsvp_name\" required"));
        assert!(html.contains("name=\"em_rsvp_email\" required"));
        assert!(html.contains("name=\"em_rsvp_submit\""));
        assert!(html.contains("value=\"abc123\""));
        assert!(!html.contains("em_rsvp_name\" value"));
    }

    #[test]
    fn form_is_appended_only_to_primary_detail() {
        let event = published();
        let body = "<p>Body</p>";

        let primary =
            append_rsvp_form(body, &event, RenderTarget::PrimaryDetail, || "t".to_string()).unwrap();
        assert!(primary.starts_with(body));
        assert!(primary.contains("em-rsvp-form"));

        for target in [RenderTarget::Listing, RenderTarget::Embedded, RenderTarget::SearchResult] {
            let html = append_rsvp_form(body, &event, target, || {
                panic!("token must not be issued for {target:?}")
            })
            .unwrap();
            assert_eq!(html, body);
        }
    }

    #[test]
    fn form_is_not_appended_to_unpublished_events() {
        let mut event = published();
        event.status = EventStatus::Draft;
        let html =
            append_rsvp_form("body", &event, RenderTarget::PrimaryDetail, || "t".to_string()).unwrap();
        assert_eq!(html, "body");
    }

    #[test]
    fn detail_shows_details_and_escapes_content() {
        let mut event = published();
        event.content = "<img src=x onerror=alert(1)>".to_string();
        let html = render_event_detail(&event, vec!["Fairs".to_string(), "Food".to_string()]).unwrap();
        assert!(html.contains("<h1>Spring Fair</h1>"));
        assert!(html.contains("2026-04-15"));
        assert!(html.contains("Hyderabad"));
        assert!(html.contains("Fairs, Food"));
        assert!(!html.contains("<img"));
    }
}
