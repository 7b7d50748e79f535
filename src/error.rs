//! Error types for argument parsing, timeout resolution, and flag decoding.

use std::fmt;

use crate::exit_codes;

/// Hint appended to every argument error.
const HELP_HINT: &str = "Use /? for help";

// ---------------------------------------------------------------------------
// ArgumentError
// ---------------------------------------------------------------------------

/// Errors raised while scanning command-line tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// A switch was supplied more than once.
    Duplicate(String),
    /// A second positional value (or an unrecognized token after the timeout).
    Unknown(String),
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicate(token) => write!(f, "Duplicate argument: {token}\n{HELP_HINT}"),
            Self::Unknown(token) => write!(f, "Unknown argument: {token}\n{HELP_HINT}"),
        }
    }
}

impl std::error::Error for ArgumentError {}

// ---------------------------------------------------------------------------
// TimeoutError
// ---------------------------------------------------------------------------

/// Errors raised while turning the raw timeout into a target timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError {
    /// Date mode: neither the strict nor the lenient parse accepted the input.
    Date(String),
    /// Relative mode: the input is not a whole number of seconds.
    Number(String),
}

impl fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(raw) => write!(f, "Failed to parse {raw} as date."),
            Self::Number(raw) => write!(f, "Failed to parse {raw} as a number of seconds."),
        }
    }
}

impl std::error::Error for TimeoutError {}

// ---------------------------------------------------------------------------
// FlagError
// ---------------------------------------------------------------------------

/// Misuse of the flag decomposition helpers. Indicates a defect in the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    /// The flag type is not declared as a combinable bit set.
    NotCombinable(&'static str),
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotCombinable(name) => {
                write!(f, "the flag type {name} is not declared as combinable")
            }
        }
    }
}

impl std::error::Error for FlagError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// An environment setting that was present but could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// LogoffError (top-level)
// ---------------------------------------------------------------------------

/// Top-level error type for a logoff run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoffError {
    Argument(ArgumentError),
    Timeout(TimeoutError),
    Flags(FlagError),
}

impl LogoffError {
    /// Process exit code reported for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Argument(_) => exit_codes::ARGUMENT,
            Self::Timeout(_) => exit_codes::TIMEOUT_PARSE,
            Self::Flags(_) => exit_codes::INTERNAL,
        }
    }
}

impl fmt::Display for LogoffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument(e) => write!(f, "{e}"),
            Self::Timeout(e) => write!(f, "{e}"),
            Self::Flags(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for LogoffError {}

impl From<ArgumentError> for LogoffError {
    fn from(e: ArgumentError) -> Self {
        Self::Argument(e)
    }
}

impl From<TimeoutError> for LogoffError {
    fn from(e: TimeoutError) -> Self {
        Self::Timeout(e)
    }
}

impl From<FlagError> for LogoffError {
    fn from(e: FlagError) -> Self {
        Self::Flags(e)
    }
}
