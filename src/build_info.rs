//! Compile-time build metadata shown in the usage text.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name from `Cargo.toml`.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Render the trailing version line of `/?` output.
pub fn version_line() -> String {
    format!("{NAME} {VERSION}")
}
