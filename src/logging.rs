//! Logging facade for the router.
//!
//! Every log line the crate emits goes through the macros in this module so
//! the backend can be picked with a Cargo feature:
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! Enable at most one of the two. With neither enabled the macros expand to
//! nothing and the arguments are not evaluated.
//!
//! Levels used across the crate:
//!
//! - `trace_log!`: per-segment matching, cache lookups, container writes.
//! - `debug_log!`: resolution results, superseded fetches, teardowns.
//! - `info_log!`: navigation start/finish, 404s, route registration.
//! - `warn_log!`: overlapping route patterns, stale writes, redirect limits.
//! - `error_log!`: loader failures caught at the dispatch boundary.
//!
//! ```ignore
//! use spa_navigator::{debug_log, info_log};
//!
//! info_log!("Navigation Programmatic: '{}' → '{}'", from, to);
//! debug_log!("Superseding in-flight fetch for key '{}'", key);
//! ```

/// Emit a **trace**-level message through the selected backend.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

/// Emit a **debug**-level message through the selected backend.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

/// Emit an **info**-level message through the selected backend.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

/// Emit a **warn**-level message through the selected backend.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

/// Emit an **error**-level message through the selected backend.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}
