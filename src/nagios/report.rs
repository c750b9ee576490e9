//! Nagios status line rendering and exit codes

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::MAIN_SEPARATOR;

use super::aggregate::Aggregate;
use super::options::FormatOptions;

/// Overall health of a run, in Nagios plugin terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(i32)]
pub enum NagiosState {
    /// No failures
    Ok = 0,
    /// At least one failure
    Critical = 2,
}

impl NagiosState {
    /// State for a failure count. Skips never raise the state.
    pub fn from_failed(failed: usize) -> Self {
        if failed > 0 {
            NagiosState::Critical
        } else {
            NagiosState::Ok
        }
    }

    /// Plugin exit code
    pub fn exit_code(&self) -> i32 {
        *self as i32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NagiosState::Ok => "OK",
            NagiosState::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for NagiosState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    text: String,
    state: NagiosState,
}

impl Report {
    /// Render the report for an aggregate.
    ///
    /// Only the final path segment of `spec_file` is shown.
    pub fn render(spec_file: &str, aggregate: &Aggregate, options: &FormatOptions) -> Self {
        let state = NagiosState::from_failed(aggregate.failed);
        let duration = format_seconds(aggregate.span());

        let mut text = format!(
            "GOSS-{} {} - Count: {}, Failed: {}, Skipped: {}, Duration: {}s",
            display_name(spec_file),
            state,
            aggregate.total,
            aggregate.failed,
            aggregate.skipped,
            duration
        );
        if options.perf_data {
            text.push_str(&format!(
                "|total={} failed={} skipped={} duration={}s",
                aggregate.total, aggregate.failed, aggregate.skipped, duration
            ));
        }
        text.push('\n');

        if options.verbose {
            for ordinal in 0..aggregate.failed {
                if ordinal >= aggregate.failures.len() {
                    tracing::debug!(ordinal, "no description captured for failure");
                }
                text.push_str(aggregate.failure_description(ordinal));
            }
        }

        Self { text, state }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn state(&self) -> NagiosState {
        self.state
    }

    pub fn exit_code(&self) -> i32 {
        self.state.exit_code()
    }

    /// Write the report to a sink in one call.
    ///
    /// Errors are returned as-is; nothing is retried.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(self.text.as_bytes())
    }
}

/// Render and write a report, returning the state it encodes
pub fn write_report<W: Write>(
    sink: &mut W,
    spec_file: &str,
    aggregate: &Aggregate,
    options: &FormatOptions,
) -> io::Result<NagiosState> {
    let report = Report::render(spec_file, aggregate, options);
    report.write_to(sink)?;
    Ok(report.state())
}

/// Final path segment of a spec identifier.
///
/// Trailing separators are ignored; an empty identifier shows as `.` and a
/// bare root as `/`.
pub fn display_name(spec_file: &str) -> &str {
    let is_sep = |c: char| c == '/' || c == MAIN_SEPARATOR;
    let trimmed = spec_file.trim_end_matches(is_sep);
    if trimmed.is_empty() {
        return if spec_file.is_empty() { "." } else { "/" };
    }
    trimmed.rsplit(is_sep).next().unwrap_or(trimmed)
}

/// Seconds with exactly three fractional digits
pub fn format_seconds(span: TimeDelta) -> String {
    let seconds = span.num_seconds() as f64 + f64::from(span.subsec_nanos()) / 1e9;
    format!("{:.3}", seconds)
}
