//! goss-nagios - Nagios-compatible reporting for goss results
//!
//! This crate aggregates a stream of goss check results and renders the
//! single status line (plus optional failure listing) and exit code a Nagios
//! plugin is expected to produce.

pub mod config;
pub mod feed;
pub mod nagios;
pub mod signal;

pub use config::{EffectiveConfig, OutputConfig};
pub use feed::{Feed, FeedError, FeedStats};
pub use nagios::{aggregate, output, Aggregate, Aggregator, FormatOptions, NagiosState, Report};
