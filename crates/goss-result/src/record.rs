//! Outcome records as produced by check execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kind::ResultKind;
use crate::outcome::Outcome;

/// Matcher output attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatcherResult {
    /// Pre-rendered matcher message (may span several lines).
    #[serde(default)]
    pub message: String,
    /// Raw expected value, if the matcher recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<serde_json::Value>,
    /// Raw observed value, if the matcher recorded one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<serde_json::Value>,
}

/// A single check result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Resource type (e.g. `File`, `Service`).
    pub resource_type: String,
    /// Resource identifier (e.g. `/etc/passwd`).
    pub resource_id: String,
    /// Property under test (e.g. `exists`, `mode`).
    pub property: String,
    /// Optional user-supplied title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Result kind.
    pub result: ResultKind,
    /// Evaluation error, if the check could not be evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
    /// Matcher output.
    #[serde(default)]
    pub matcher_result: MatcherResult,
    /// Evaluation start.
    pub start_time: DateTime<Utc>,
    /// Evaluation end.
    pub end_time: DateTime<Utc>,
}

impl TestResult {
    /// Create a result with an empty matcher output.
    pub fn new(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        property: impl Into<String>,
        result: ResultKind,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            property: property.into(),
            title: String::new(),
            result,
            err: None,
            matcher_result: MatcherResult::default(),
            start_time,
            end_time,
        }
    }

    /// Attach a matcher message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.matcher_result.message = message.into();
        self
    }

    /// Attach raw expected/actual values.
    pub fn with_raw(mut self, expected: serde_json::Value, actual: serde_json::Value) -> Self {
        self.matcher_result.expected = Some(expected);
        self.matcher_result.actual = Some(actual);
        self
    }

    /// Attach an evaluation error.
    pub fn with_err(mut self, err: impl Into<String>) -> Self {
        self.err = Some(err.into());
        self
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn subject(&self) -> String {
        format!("{}: {}: {}", self.resource_type, self.resource_id, self.property)
    }

    fn has_raw(&self) -> bool {
        self.matcher_result.expected.is_some() || self.matcher_result.actual.is_some()
    }

    fn humanize_failure(&self, compact: bool, include_raw: bool) -> String {
        let message = self.matcher_result.message.trim_end();
        let mut out = if compact {
            let joined = message
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if joined.is_empty() {
                format!("{}: doesn't match", self.subject())
            } else {
                format!("{}: {}", self.subject(), joined)
            }
        } else {
            let mut s = String::new();
            if !self.title.is_empty() {
                s.push_str(&format!("Title: {}\n", self.title));
            }
            s.push_str(&format!("{}:", self.subject()));
            for line in message.lines() {
                s.push_str(&format!("\n    {}", line));
            }
            s
        };

        if include_raw && self.has_raw() {
            let expected = render_raw(self.matcher_result.expected.as_ref());
            let actual = render_raw(self.matcher_result.actual.as_ref());
            if compact {
                out.push_str(&format!(" (expected: {}, actual: {})", expected, actual));
            } else {
                out.push_str(&format!(
                    "\nExpected:\n    {}\nActual:\n    {}",
                    expected, actual
                ));
            }
        }

        out
    }
}

fn render_raw(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "null".to_string(),
    }
}

impl Outcome for TestResult {
    fn kind(&self) -> ResultKind {
        self.result
    }

    fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    fn humanize(&self, compact: bool, include_raw: bool) -> String {
        if let Some(err) = &self.err {
            return format!("{}: Error: {}", self.subject(), err);
        }
        match self.result {
            ResultKind::Success => format!("{}: matches expectation", self.subject()),
            ResultKind::Skip => format!("{}: skipped", self.subject()),
            ResultKind::Fail | ResultKind::Other(_) => self.humanize_failure(compact, include_raw),
        }
    }
}
