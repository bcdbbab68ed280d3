//! Mail transport seam.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailError(pub String);

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "mail delivery failed: {}", self.0)
    }
}

impl Error for MailError {}

/// Outbound mail transport. No delivery guarantee is assumed.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// In-process outbox. Clones share the same message list.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted so far, oldest first.
    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Mailer for MemoryMailer {
    fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|_| MailError("outbox lock poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}
