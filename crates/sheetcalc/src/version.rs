//! Version information.

/// Get the version string.
#[must_use]
#[allow(dead_code)]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get the full version string with build info.
#[must_use]
#[allow(dead_code)]
pub fn full_version() -> String {
    format!("sheetcalc {}", version())
}
