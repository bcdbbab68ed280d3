//! Per-form anti-forgery tokens.
//!
//! # Responsibility
//! - Issue a token when a form is rendered.
//! - Verify the token when the form comes back.
//!
//! # Invariants
//! - A token is bound to the site secret, the form action and the target scope
//!   (usually the event id).
//! - A token stays valid for the tick it was issued in and the following one,
//!   so a form is accepted for 12 to 24 hours after rendering.

use crate::clock::Clock;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Action name for RSVP forms.
pub const RSVP_ACTION: &str = "em_rsvp_action";
/// Action name for the event details editor.
pub const EVENT_DETAILS_ACTION: &str = "em_save_event_meta";

const TICK_SECONDS: i64 = 12 * 60 * 60;
const TOKEN_HEX_LEN: usize = 32;

pub trait FormTokens {
    fn issue(&self, action: &str, scope: &str) -> String;
    fn verify(&self, action: &str, scope: &str, token: &str) -> bool;
}

/// SHA-256 keyed tokens with half-day ticks.
pub struct HashFormTokens {
    secret: String,
    clock: Arc<dyn Clock>,
}

impl HashFormTokens {
    pub fn new(secret: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.into(),
            clock,
        }
    }

    fn current_tick(&self) -> i64 {
        self.clock.now().timestamp().div_euclid(TICK_SECONDS)
    }

    fn token_for_tick(&self, tick: i64, action: &str, scope: &str) -> String {
        let tick_text = tick.to_string();
        let mut hasher = Sha256::new();
        for part in [self.secret.as_str(), tick_text.as_str(), action, scope] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        let mut token = hex::encode(hasher.finalize());
        token.truncate(TOKEN_HEX_LEN);
        token
    }
}

impl FormTokens for HashFormTokens {
    fn issue(&self, action: &str, scope: &str) -> String {
        self.token_for_tick(self.current_tick(), action, scope)
    }

    fn verify(&self, action: &str, scope: &str, token: &str) -> bool {
        let token = token.trim();
        if token.len() != TOKEN_HEX_LEN {
            return false;
        }
        let tick = self.current_tick();
        [tick, tick - 1]
            .into_iter()
            .any(|candidate| constant_time_eq(&self.token_for_tick(candidate, action, scope), token))
    }
}

fn constant_time_eq(expected: &str, actual: &str) -> bool {
    let expected = expected.as_bytes();
    let actual = actual.as_bytes();
    if expected.len() != actual.len() {
        return false;
    }
    expected
        .iter()
        .zip(actual)
        .fold(0u8, |acc, (left, right)| acc | (left ^ right))
        == 0
}
