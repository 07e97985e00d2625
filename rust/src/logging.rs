//! Verbosity-gated logging macros for schedule analysis.
//!
//! Output goes to stderr and costs nothing when verbosity is 0.
//! - 0: SILENT
//! - 1: SUMMARY (critical path found, scenarios generated, final scores)
//! - 2: DETAIL (per-task timings, per-scenario outcomes)
//! - 3: TRACE (per-edge propagation steps)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_SUMMARY: u8 = 1;
pub const VERBOSITY_DETAIL: u8 = 2;
pub const VERBOSITY_TRACE: u8 = 3;

/// Log at SUMMARY level (verbosity >= 1).
#[macro_export]
macro_rules! log_summary {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_SUMMARY {
            eprintln!("[delaycast] {}", format_args!($($arg)*));
        }
    };
}

/// Log at DETAIL level (verbosity >= 2).
#[macro_export]
macro_rules! log_detail {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DETAIL {
            eprintln!("[delaycast]   {}", format_args!($($arg)*));
        }
    };
}

/// Log at TRACE level (verbosity >= 3).
#[macro_export]
macro_rules! log_trace {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_TRACE {
            eprintln!("[delaycast]     {}", format_args!($($arg)*));
        }
    };
}
