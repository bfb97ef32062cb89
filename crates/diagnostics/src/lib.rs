// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Logging for the naveditor crates.
//!
//! Everything logs through the macros below, which forward to `emit`.
//! Output goes to stderr and is controlled by `NAVEDITOR_LOG`:
//! - `off` (default): nothing
//! - `error`, `warn`, `info`, `debug`: minimum level shown

use std::sync::Once;

pub use emit;

/// Environment variable selecting the minimum log level.
pub const LOG_ENV: &str = "NAVEDITOR_LOG";

static INIT: Once = Once::new();

/// Parsed value of [`LOG_ENV`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Returns the level and whether the input was recognized.
    #[must_use]
    pub fn parse(value: &str) -> (Self, bool) {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "off" => (LogLevel::Off, true),
            "error" => (LogLevel::Error, true),
            "warn" => (LogLevel::Warn, true),
            "info" => (LogLevel::Info, true),
            "debug" => (LogLevel::Debug, true),
            _ => (LogLevel::Info, false),
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

/// Initialize diagnostics from `NAVEDITOR_LOG`.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let raw = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());
        let (level, recognized) = LogLevel::parse(&raw);

        let Some(min) = level.emit_level() else {
            return;
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min))
            .init();

        if !recognized {
            emit::warn!("unknown {var} value {value}, using info", var: LOG_ENV, value: raw);
        }

        // The runtime lives for the whole process.
        std::mem::forget(rt);
    });
}

/// Normal operations: backend selected, bundle imported, file written.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Detailed per-operation diagnostics.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Recoverable problems: invalid rows dropped, storage fallbacks.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Failures that stop an operation.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

pub use init_diagnostics as init;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_parse_levels() {
        assert_eq!(LogLevel::parse("off"), (LogLevel::Off, true));
        assert_eq!(LogLevel::parse("DEBUG"), (LogLevel::Debug, true));
        assert_eq!(LogLevel::parse(" warn "), (LogLevel::Warn, true));
        assert_eq!(LogLevel::parse("loud"), (LogLevel::Info, false));
    }

    #[test]
    fn test_macros_compile() {
        log_info!("opened {path}", path: "/notes.txt");
        log_debug!("read {bytes} bytes", bytes: 42);
        log_warn!("fallback");
        log_error!("failed");
        info!("short info");
        debug!("short debug {value}", value: 1);
        warn!("short warn");
        error!("short error");
    }
}
