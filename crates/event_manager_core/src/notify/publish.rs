//! Admin notice sent when an event becomes published.
//!
//! # Invariants
//! - Only a change whose `is_publication()` holds produces a message.
//! - A delivery failure is logged and reported, never propagated.

use crate::model::event::{Event, StatusChange};
use crate::notify::mailer::{MailMessage, Mailer};
use log::{info, warn};

/// What happened to one status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// The change was not a publication.
    Skipped,
    Sent,
    /// Delivery failed; nothing is retried.
    Failed,
}

/// Builds the admin notice for a freshly published event.
pub fn compose_publish_notice(event: &Event, permalink: &str, admin_email: &str) -> MailMessage {
    let mut body = String::from("A new event has been published:\n\n");
    body.push_str(&format!("Title: {}\n", event.title));
    body.push_str(&format!("Date: {}\n", event.date_text()));
    body.push_str(&format!("Location: {}\n\n", event.location_text()));
    body.push_str(&format!("View Event: {permalink}\n"));

    MailMessage {
        to: admin_email.to_string(),
        subject: format!("New Event Published: {}", event.title),
        body,
    }
}

/// Sends publication notices to the site admin.
pub struct PublishNotifier<'a> {
    mailer: &'a dyn Mailer,
    admin_email: &'a str,
}

impl<'a> PublishNotifier<'a> {
    pub fn new(mailer: &'a dyn Mailer, admin_email: &'a str) -> Self {
        Self {
            mailer,
            admin_email,
        }
    }

    /// Sends one notice when `change` is a publication.
    pub fn on_status_change(
        &self,
        change: &StatusChange,
        event: &Event,
        permalink: &str,
    ) -> NotificationOutcome {
        if !change.is_publication() {
            return NotificationOutcome::Skipped;
        }

        let message = compose_publish_notice(event, permalink, self.admin_email);
        match self.mailer.send(&message) {
            Ok(()) => {
                info!(
                    "event=publish_notice module=notify status=ok event_id={}",
                    event.id
                );
                NotificationOutcome::Sent
            }
            Err(err) => {
                warn!(
                    "event=publish_notice module=notify status=error event_id={} error={}",
                    event.id, err
                );
                NotificationOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_publish_notice, NotificationOutcome, PublishNotifier};
    use crate::model::event::{Event, EventDate, EventStatus, StatusChange};
    use crate::notify::mailer::{MailError, MailMessage, Mailer, MemoryMailer};

    struct FailingMailer;

    impl Mailer for FailingMailer {
        fn send(&self, _message: &MailMessage) -> Result<(), MailError> {
            Err(MailError("smtp unreachable".to_string()))
        }
    }

    fn spring_fair() -> Event {
        let mut event = Event::new("Spring Fair");
        event.date = Some(EventDate::parse("2026-04-15").unwrap());
        event.location = Some("Hyderabad".to_string());
        event
    }

    fn change(event: &Event, previous: EventStatus, current: EventStatus) -> StatusChange {
        StatusChange {
            event_id: event.id,
            previous: Some(previous),
            current,
        }
    }

    #[test]
    fn notice_lists_title_date_location_and_link() {
        let event = spring_fair();
        let message =
            compose_publish_notice(&event, "https://example.com/events/1/", "admin@example.com");

        assert_eq!(message.to, "admin@example.com");
        assert_eq!(message.subject, "New Event Published: Spring Fair");
        assert!(message.body.contains("Title: Spring Fair\n"));
        assert!(message.body.contains("Date: 2026-04-15\n"));
        assert!(message.body.contains("Location: Hyderabad\n"));
        assert!(message
            .body
            .contains("View Event: https://example.com/events/1/"));
    }

    #[test]
    fn notice_keeps_empty_lines_for_missing_details() {
        let event = Event::new("Undated");
        let message = compose_publish_notice(&event, "link", "admin@example.com");
        assert!(message.body.contains("Date: \n"));
        assert!(message.body.contains("Location: \n"));
    }

    #[test]
    fn only_publication_sends_mail() {
        let mailer = MemoryMailer::new();
        let notifier = PublishNotifier::new(&mailer, "admin@example.com");
        let event = spring_fair();

        let first = notifier.on_status_change(
            &change(&event, EventStatus::Draft, EventStatus::Publish),
            &event,
            "link",
        );
        let resave = notifier.on_status_change(
            &change(&event, EventStatus::Publish, EventStatus::Publish),
            &event,
            "link",
        );

        assert_eq!(first, NotificationOutcome::Sent);
        assert_eq!(resave, NotificationOutcome::Skipped);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[test]
    fn delivery_failure_is_reported_not_raised() {
        let notifier = PublishNotifier::new(&FailingMailer, "admin@example.com");
        let event = spring_fair();
        let outcome = notifier.on_status_change(
            &change(&event, EventStatus::Pending, EventStatus::Publish),
            &event,
            "link",
        );
        assert_eq!(outcome, NotificationOutcome::Failed);
    }
}
