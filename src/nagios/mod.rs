//! Nagios-compatible output for goss results
//!
//! A run goes through two phases on one thread:
//! 1. [`Aggregator`] drains the producer until it closes
//! 2. [`Report`] renders the status line and decides the exit code
//!
//! ```text
//! GOSS-goss.yaml CRITICAL - Count: 5, Failed: 2, Skipped: 1, Duration: 2.000s|total=5 failed=2 skipped=1 duration=2.000s
//! Fail 1 - File: /etc/passwd: mode: ...
//! Fail 2 - Service: sshd: running: ...
//! ```

mod aggregate;
mod options;
mod report;

pub use aggregate::{aggregate, Aggregate, Aggregator};
pub use options::{
    is_known_option, FormatOptions, EXCLUDE_RAW, GLOBAL_OPTIONS, PERF_DATA, VALID_OPTIONS, VERBOSE,
};
pub use report::{display_name, format_seconds, write_report, NagiosState, Report};

use goss_result::{Outcome, ResultBatch};
use std::io::{self, Write};

/// Drain `producer`, then write the report for it to `sink`.
///
/// Returns the state of the run; its exit code is what a Nagios plugin
/// should exit with.
pub fn output<P, O, W>(
    sink: &mut W,
    producer: P,
    spec_file: &str,
    options: &FormatOptions,
) -> io::Result<NagiosState>
where
    P: IntoIterator<Item = ResultBatch<O>>,
    O: Outcome,
    W: Write,
{
    let aggregate = aggregate(producer, options);
    write_report(sink, spec_file, &aggregate, options)
}
