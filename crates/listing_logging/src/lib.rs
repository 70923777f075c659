#![deny(missing_docs)]
//! Shared logging utilities for the listing workspace.
//!
//! This crate provides the `listing_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Thread-local id of the media editing session currently being driven.
    static EDIT_SESSION: Cell<u64> = const { Cell::new(0) };
}

/// Tags log lines emitted on this thread with an editing session id.
/// Passing 0 clears the tag.
pub fn set_edit_session(session: u64) {
    EDIT_SESSION.with(|v| v.set(session));
}

/// Returns the editing session id tagged on the current thread, or 0.
pub fn edit_session() -> u64 {
    EDIT_SESSION.with(|v| v.get())
}

/// Dispatches to the `log` macro of the given level, prefixing the session tag.
#[doc(hidden)]
#[macro_export]
macro_rules! __listing_log {
    ($level:ident, $($arg:tt)*) => {{
        let session = $crate::edit_session();
        if session == 0 {
            $crate::log::$level!($($arg)*);
        } else {
            $crate::log::$level!("[session {}] {}", session, format_args!($($arg)*));
        }
    }};
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! listing_trace {
    ($($arg:tt)*) => {{
        $crate::__listing_log!(trace, $($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! listing_info {
    ($($arg:tt)*) => {{
        $crate::__listing_log!(info, $($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! listing_debug {
    ($($arg:tt)*) => {{
        $crate::__listing_log!(debug, $($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! listing_warn {
    ($($arg:tt)*) => {{
        $crate::__listing_log!(warn, $($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! listing_error {
    ($($arg:tt)*) => {{
        $crate::__listing_log!(error, $($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
