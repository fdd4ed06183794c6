//! Single-slot, auto-expiring user notification.
//!
//! At most one message is active. A new message replaces the old one, and a
//! message stops being visible once its expiry passes. Expiry is evaluated
//! against the caller's clock on read, so no timer thread is involved.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// How long a notification stays visible by default.
pub const DEFAULT_NOTIFICATION_TTL_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
    pub expires_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Debug)]
pub struct NotificationEmitter {
    slot: Mutex<Option<Notification>>,
    ttl: Duration,
    enabled: bool,
}

impl NotificationEmitter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
            enabled: true,
        }
    }

    /// An emitter that drops every message.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Replace any current message with a new one expiring `ttl` after `now`.
    pub fn emit(&self, kind: NotificationKind, text: impl Into<String>, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }
        let notification = Notification {
            kind,
            text: text.into(),
            expires_at: now + self.ttl,
        };
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(notification);
    }

    /// The active message, if any. Expired messages are cleared on read.
    pub fn current(&self, now: DateTime<Utc>) -> Option<Notification> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|n| !n.is_active(now)) {
            *slot = None;
        }
        slot.clone()
    }

    pub fn dismiss(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Default for NotificationEmitter {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_NOTIFICATION_TTL_SECS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_expires_after_ttl() {
        let emitter = NotificationEmitter::default();
        let now = Utc::now();
        emitter.emit(NotificationKind::Success, "Daily progress reset", now);

        assert!(emitter.current(now + Duration::seconds(4)).is_some());
        assert!(emitter.current(now + Duration::seconds(5)).is_none());
        // Stays cleared even if asked about an earlier instant afterwards.
        assert!(emitter.current(now).is_none());
    }

    #[test]
    fn new_message_replaces_old() {
        let emitter = NotificationEmitter::default();
        let now = Utc::now();
        emitter.emit(NotificationKind::Success, "first", now);
        emitter.emit(NotificationKind::Error, "second", now + Duration::seconds(3));

        let current = emitter.current(now + Duration::seconds(6)).unwrap();
        assert_eq!(current.kind, NotificationKind::Error);
        assert_eq!(current.text, "second");
    }

    #[test]
    fn dismiss_clears_immediately() {
        let emitter = NotificationEmitter::default();
        let now = Utc::now();
        emitter.emit(NotificationKind::Error, "oops", now);
        emitter.dismiss();
        assert!(emitter.current(now).is_none());
    }

    #[test]
    fn disabled_emitter_stays_silent() {
        let emitter = NotificationEmitter::disabled();
        let now = Utc::now();
        emitter.emit(NotificationKind::Success, "hidden", now);
        assert!(emitter.current(now).is_none());
    }
}
