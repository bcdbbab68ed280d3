//! Publication notices.
//!
//! # Responsibility
//! - Compose the plain-text notice sent when an event is published.
//! - Hand it to a [`Mailer`] without letting delivery failures escape.
//!
//! # Invariants
//! - Only a move from a non-published status into `publish` sends mail.
//! - Delivery is attempted once; failures are logged and dropped.

mod mailer;
mod publish;

pub use mailer::{MailError, MailMessage, Mailer, MemoryMailer};
pub use publish::{compose_publish_notice, NotificationOutcome, PublishNotifier};
