//! Submitted form payloads.
//!
//! Forms arrive as decoded key/value pairs. Parsing never fails: missing
//! keys stay `None` and the handlers decide what that means.

/// RSVP name input.
pub const FIELD_RSVP_NAME: &str = "em_rsvp_name";
/// RSVP email input.
pub const FIELD_RSVP_EMAIL: &str = "em_rsvp_email";
/// RSVP submit marker; the submission is ignored without it.
pub const FIELD_RSVP_SUBMIT: &str = "em_rsvp_submit";
/// RSVP anti-forgery token.
pub const FIELD_RSVP_NONCE: &str = "em_rsvp_nonce";

pub const FIELD_DETAILS_DATE: &str = "event_date";
pub const FIELD_DETAILS_LOCATION: &str = "event_location";
pub const FIELD_DETAILS_NONCE: &str = "em_event_meta_nonce";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RsvpForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub submit: Option<String>,
    pub nonce: Option<String>,
}

impl RsvpForm {
    /// Collects RSVP fields; unknown keys are ignored and later duplicates win.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                FIELD_RSVP_NAME => &mut form.name,
                FIELD_RSVP_EMAIL => &mut form.email,
                FIELD_RSVP_SUBMIT => &mut form.submit,
                FIELD_RSVP_NONCE => &mut form.nonce,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        form
    }

    pub fn has_submit_marker(&self) -> bool {
        self.submit.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDetailsForm {
    pub date: Option<String>,
    pub location: Option<String>,
    pub nonce: Option<String>,
}

impl EventDetailsForm {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key {
                FIELD_DETAILS_DATE => &mut form.date,
                FIELD_DETAILS_LOCATION => &mut form.location,
                FIELD_DETAILS_NONCE => &mut form.nonce,
                _ => continue,
            };
            *slot = Some(value.to_string());
        }
        form
    }
}
