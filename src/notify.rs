//! Transient user notifications.
//!
//! When a view fails to load the router renders the error view and also
//! raises a short-lived notification (a toast in a browser host). The host
//! supplies the [`Notifier`]; [`LogNotifier`] is the fallback and simply
//! logs the message.

use crate::warn_log;
use std::cell::RefCell;
use std::time::Duration;

/// Shows a message to the user for `duration`.
pub trait Notifier {
    fn notify(&self, message: &str, duration: Duration);
}

/// Writes notifications to the log at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, duration: Duration) {
        warn_log!("Notification ({} ms): {}", duration.as_millis(), message);
    }
}

/// Keeps every notification in memory, for headless hosts and tests.
///
/// ```
/// use spa_navigator::{Notifier, RecordingNotifier};
/// use std::time::Duration;
///
/// let notifier = RecordingNotifier::new();
/// notifier.notify("Failed to load event", Duration::from_secs(3));
/// assert_eq!(notifier.messages(), vec!["Failed to load event"]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<(String, Duration)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|(m, _)| m.clone()).collect()
    }

    /// Messages with the duration they were shown for.
    pub fn entries(&self) -> Vec<(String, Duration)> {
        self.sent.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.borrow().is_empty()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, duration: Duration) {
        self.sent.borrow_mut().push((message.to_string(), duration));
    }
}
