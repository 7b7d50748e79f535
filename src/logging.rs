//! Diagnostic logging setup.

use std::io;

use tracing_subscriber::EnvFilter;

use crate::config::DEFAULT_LOG_FILTER;

/// Build the subscriber filter, falling back to the default on bad input.
pub fn build_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global stderr subscriber. Returns `false` if one is already set.
pub fn init(directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(directive))
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
        .is_ok()
}
