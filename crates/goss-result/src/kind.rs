//! Result kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire value for a passing check.
pub const SUCCESS: i64 = 0;
/// Wire value for a failing check.
pub const FAIL: i64 = 1;
/// Wire value for a skipped check.
pub const SKIP: i64 = 2;

/// Kind of a single check result.
///
/// Serialized as the integer code used by result producers. Codes outside the
/// known set are kept as [`ResultKind::Other`] so they survive a round trip;
/// reporters count them toward the total only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ResultKind {
    /// The check matched its expectation.
    Success,
    /// The check did not match its expectation.
    Fail,
    /// The check was not evaluated.
    Skip,
    /// Any other producer-specific code.
    Other(i64),
}

impl ResultKind {
    /// Integer code for this kind.
    pub fn code(&self) -> i64 {
        match self {
            Self::Success => SUCCESS,
            Self::Fail => FAIL,
            Self::Skip => SKIP,
            Self::Other(code) => *code,
        }
    }
}

impl From<i64> for ResultKind {
    fn from(code: i64) -> Self {
        match code {
            SUCCESS => Self::Success,
            FAIL => Self::Fail,
            SKIP => Self::Skip,
            other => Self::Other(other),
        }
    }
}

impl From<ResultKind> for i64 {
    fn from(kind: ResultKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Fail => write!(f, "FAIL"),
            Self::Skip => write!(f, "SKIP"),
            Self::Other(code) => write!(f, "OTHER({})", code),
        }
    }
}
