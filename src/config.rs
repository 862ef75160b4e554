//! Router configuration.
//!
//! [`RouterConfig`] collects the knobs the router reads at dispatch time:
//! where "home" and "login" live, how long transient notifications stay up,
//! the fallback messages used when no custom renderer is installed, and the
//! redirect and cache limits.
//!
//! With the `serde` feature the config can be loaded from any serde format.
//! Durations are written in milliseconds and missing fields take their
//! default.
//!
//! ```
//! use spa_navigator::RouterConfig;
//! use std::time::Duration;
//!
//! let config = RouterConfig::default()
//!     .login_path("/sign-in")
//!     .notification_duration(Duration::from_secs(5));
//! assert_eq!(config.login_path, "/sign-in");
//! assert_eq!(config.home_path, "/");
//! ```

use crate::location::normalize_path;
use std::time::Duration;

/// Default lifetime of a transient notification.
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);

/// Maximum chained redirects before a navigation is blocked.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Settings read by the [`Router`](crate::Router).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Where `complete_login` goes when no destination was stored.
    pub home_path: String,

    /// Where the router sends users when a view needs authentication.
    pub login_path: String,

    /// How long error notifications stay visible.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub notification_duration: Duration,

    /// Notification text shown when a view fails to load.
    pub error_notification: String,

    /// Text rendered when no route matches and no 404 renderer is set.
    pub not_found_message: String,

    /// Skip the history push when navigating to the current path and query.
    pub dedupe_same_path: bool,

    /// Chained guard or loader redirects allowed per navigation.
    pub max_redirects: usize,

    /// Entries kept by the dynamic-route resolution cache.
    pub cache_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            home_path: "/".to_string(),
            login_path: "/login".to_string(),
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            error_notification: "Something went wrong while loading this page.".to_string(),
            not_found_message: "Page not found".to_string(),
            dedupe_same_path: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            cache_capacity: 256,
        }
    }
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn home_path(mut self, path: impl AsRef<str>) -> Self {
        self.home_path = normalize_path(path.as_ref()).into_owned();
        self
    }

    pub fn login_path(mut self, path: impl AsRef<str>) -> Self {
        self.login_path = normalize_path(path.as_ref()).into_owned();
        self
    }

    pub fn notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    pub fn error_notification(mut self, message: impl Into<String>) -> Self {
        self.error_notification = message.into();
        self
    }

    pub fn not_found_message(mut self, message: impl Into<String>) -> Self {
        self.not_found_message = message.into();
        self
    }

    pub fn dedupe_same_path(mut self, dedupe: bool) -> Self {
        self.dedupe_same_path = dedupe;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Set the resolution cache size. Zero disables the cache.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
