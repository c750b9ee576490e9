//! The view of a check result that output formatters consume.

use chrono::{DateTime, Utc};

use crate::kind::ResultKind;

/// One evaluated check, as seen by a formatter.
///
/// Formatters only read outcomes. The human rendering is produced on demand
/// so that formatters which never show details pay nothing for it.
pub trait Outcome {
    /// Kind of this result.
    fn kind(&self) -> ResultKind;

    /// When evaluation of the check started.
    fn start_time(&self) -> DateTime<Utc>;

    /// When evaluation of the check finished.
    fn end_time(&self) -> DateTime<Utc>;

    /// Render the result for humans.
    ///
    /// `compact` keeps the rendering on as few lines as possible.
    /// `include_raw` appends the raw expected/actual values when the producer
    /// recorded them.
    fn humanize(&self, compact: bool, include_raw: bool) -> String;
}

impl<T: Outcome + ?Sized> Outcome for &T {
    fn kind(&self) -> ResultKind {
        (**self).kind()
    }

    fn start_time(&self) -> DateTime<Utc> {
        (**self).start_time()
    }

    fn end_time(&self) -> DateTime<Utc> {
        (**self).end_time()
    }

    fn humanize(&self, compact: bool, include_raw: bool) -> String {
        (**self).humanize(compact, include_raw)
    }
}
