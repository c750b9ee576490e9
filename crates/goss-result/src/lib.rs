//! Goss Result Types
//!
//! Defines the outcome records produced by check execution and consumed by
//! output formatters.

pub mod kind;
pub mod outcome;
pub mod record;

pub use kind::ResultKind;
pub use outcome::Outcome;
pub use record::{MatcherResult, TestResult};

/// A group of outcomes delivered together by a producer.
///
/// Outcomes keep the order they were produced in.
pub type ResultBatch<T = TestResult> = Vec<T>;
