//! ui::output
//!
//! Diagnostic output formatting.
//!
//! # Design
//!
//! The prompt itself goes to stdout; everything here goes to stderr so
//! shells never capture diagnostics into the prompt string.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Normal mode - prompt output only
    Normal,
    /// Debug mode - stage timing and decision tracing on stderr
    Debug,
}

impl Verbosity {
    /// Create verbosity from the debug flag.
    pub fn from_flags(debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print a warning message (only in debug mode; a prompt render must
/// stay quiet on stderr by default).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("warning: {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}
