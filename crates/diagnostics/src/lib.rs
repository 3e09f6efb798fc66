//! Lightweight diagnostics for the gridns workspace
//!
//! Provides structured logging shared by every crate in the workspace,
//! built on `emit` with a terminal emitter.
//!
//! Usage:
//! - Set GRIDNS_LOG=off (default) - no logs
//! - Set GRIDNS_LOG=info - resolutions, stand-ins, listings
//! - Set GRIDNS_LOG=debug - every catalog round trip

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted by [`init_diagnostics`]
pub const LOG_ENV: &str = "GRIDNS_LOG";

static INIT: Once = Once::new();

/// Threshold selected through `GRIDNS_LOG`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Parse a `GRIDNS_LOG` value, case-insensitively
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "off" => Some(LogLevel::Off),
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    fn emit_level(self) -> Option<emit::Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(emit::Level::Error),
            LogLevel::Warn => Some(emit::Level::Warn),
            LogLevel::Info => Some(emit::Level::Info),
            LogLevel::Debug => Some(emit::Level::Debug),
        }
    }
}

/// Initialize diagnostics based on the GRIDNS_LOG environment variable
///
/// Call once at application startup. Later calls are ignored.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_default();
        let (level, unknown) = match LogLevel::parse(&raw) {
            Some(level) => (level, false),
            None => (LogLevel::Info, true),
        };

        let Some(min) = level.emit_level() else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        if unknown {
            emit::warn!("Unknown {var} value '{value}', using 'info'", var: LOG_ENV, value: raw);
        }

        // The emitter lives for the rest of the process
        std::mem::forget(rt);
    });
}

/// Log detailed diagnostics (catalog queries, paging offsets, classifier decisions)
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log basic operations (resolutions, stand-in synthesis, listings)
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log warning conditions (config issues, unexpected catalog answers)
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log critical error conditions at application boundaries
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
