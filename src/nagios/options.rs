//! Format options understood by the Nagios output

use serde::{Deserialize, Serialize};

/// Append a `|total=... duration=...` performance-data suffix
pub const PERF_DATA: &str = "perfdata";

/// List every failure below the status line
pub const VERBOSE: &str = "verbose";

/// Leave raw expected/actual values out of failure details
pub const EXCLUDE_RAW: &str = "exclude_raw";

/// Options specific to the Nagios output
pub const VALID_OPTIONS: &[&str] = &[PERF_DATA, VERBOSE];

/// Options every output accepts
pub const GLOBAL_OPTIONS: &[&str] = &[EXCLUDE_RAW];

/// Formatting toggles, read once per run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Emit performance data after the status line
    pub perf_data: bool,

    /// Capture and emit per-failure descriptions
    pub verbose: bool,

    /// Omit raw detail from failure descriptions
    pub exclude_raw: bool,
}

impl FormatOptions {
    /// Build options from a list of option names.
    ///
    /// Unknown names are ignored here; validation happens when the
    /// configuration is loaded.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let has = |wanted: &str| names.iter().any(|n| n.as_ref() == wanted);
        Self {
            perf_data: has(PERF_DATA),
            verbose: has(VERBOSE),
            exclude_raw: has(EXCLUDE_RAW),
        }
    }

    /// Whether failure details should carry raw values
    pub fn include_raw(&self) -> bool {
        !self.exclude_raw
    }
}

/// Check whether an option name is accepted by the Nagios output
pub fn is_known_option(name: &str) -> bool {
    VALID_OPTIONS.contains(&name) || GLOBAL_OPTIONS.contains(&name)
}
