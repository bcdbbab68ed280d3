//! Admin "Event Details" box and column values.

use crate::model::event::Event;
use crate::registry::{FIELD_EVENT_DATE, FIELD_EVENT_LOCATION};
use crate::render::RenderError;
use askama::Template;

#[derive(Template)]
#[template(path = "event_details_box.html")]
struct EventDetailsBoxTemplate<'a> {
    token: &'a str,
    date: String,
    location: &'a str,
}

/// Renders the admin "Event Details" fields pre-filled with current values.
pub fn render_event_details_box(event: &Event, token: &str) -> Result<String, RenderError> {
    Ok(EventDetailsBoxTemplate {
        token,
        date: event.date_text(),
        location: event.location_text(),
    }
    .render()?)
}

/// Plain-text cell value for one admin list column; unknown columns are empty.
pub fn admin_column_value(event: &Event, column: &str) -> String {
    match column {
        FIELD_EVENT_DATE => event.date_text(),
        FIELD_EVENT_LOCATION => event.location_text().to_string(),
        _ => String::new(),
    }
}
