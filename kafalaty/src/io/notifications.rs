//! Notification and loading façade.
//!
//! The presentation layer implements [`Notifier`]; this crate only emits
//! signals through it. [`BusyGuard`] pairs every `show_busy` with a
//! `clear_busy`, including on early returns.

use log::{error, info, warn};
use shared::NotificationKind;
use std::sync::Mutex;

pub trait Notifier: Send + Sync {
    /// Show a user-visible notification. Fire and forget.
    fn notify(&self, title: &str, message: &str, kind: NotificationKind);

    fn show_busy(&self, message: &str);

    fn clear_busy(&self);
}

/// Clears the busy indicator when dropped
#[must_use = "the busy indicator is cleared as soon as the guard is dropped"]
pub struct BusyGuard<'a> {
    notifier: &'a dyn Notifier,
}

impl<'a> BusyGuard<'a> {
    pub fn show(notifier: &'a dyn Notifier, message: &str) -> Self {
        notifier.show_busy(message);
        Self { notifier }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.notifier.clear_busy();
    }
}

/// Writes notifications to the log. Used when no presentation layer is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Error => error!("[{}] {}", title, message),
            NotificationKind::Warning => warn!("[{}] {}", title, message),
            NotificationKind::Success | NotificationKind::Info => info!("[{}] {}", title, message),
        }
    }

    fn show_busy(&self, message: &str) {
        info!("⏳ {}", message);
    }

    fn clear_busy(&self) {}
}

/// Signal captured by [`RecordingNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierEvent {
    Notified {
        title: String,
        message: String,
        kind: NotificationKind,
    },
    Busy(String),
    Cleared,
}

/// Keeps every signal in order, for assertions
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifierEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: NotifierEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    pub fn events(&self) -> Vec<NotifierEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Only the user-visible notifications, as `(kind, message)`
    pub fn notifications(&self) -> Vec<(NotificationKind, String)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                NotifierEvent::Notified { message, kind, .. } => Some((kind, message)),
                _ => None,
            })
            .collect()
    }

    /// Whether every `Busy` was followed by a `Cleared`
    pub fn busy_balanced(&self) -> bool {
        let mut depth: i64 = 0;
        for event in self.events() {
            match event {
                NotifierEvent::Busy(_) => depth += 1,
                NotifierEvent::Cleared => depth -= 1,
                NotifierEvent::Notified { .. } => {}
            }
            if depth < 0 {
                return false;
            }
        }
        depth == 0
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str, kind: NotificationKind) {
        self.push(NotifierEvent::Notified {
            title: title.to_string(),
            message: message.to_string(),
            kind,
        });
    }

    fn show_busy(&self, message: &str) {
        self.push(NotifierEvent::Busy(message.to_string()));
    }

    fn clear_busy(&self) {
        self.push(NotifierEvent::Cleared);
    }
}
