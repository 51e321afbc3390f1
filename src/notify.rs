use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient message for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub expires_at: Instant,
}

/// Active notifications in the order they were raised. Each one expires on
/// its own timer.
#[derive(Debug, Clone)]
pub struct Notifications {
    ttl: Duration,
    items: VecDeque<Notification>,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Notifications {
            ttl,
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) {
        self.items.push_back(Notification {
            kind,
            message: message.into(),
            expires_at: now + self.ttl,
        });
    }

    /// Drop every notification whose deadline has passed.
    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|n| n.expires_at > now);
    }

    pub fn active(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
