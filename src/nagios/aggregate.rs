//! Single-pass aggregation of check outcomes
//!
//! The aggregator drains a producer of [`ResultBatch`]es to completion and
//! accumulates counts, the overall time span and (in verbose mode) a rendered
//! description for each failure. It is the only owner of the [`Aggregate`]
//! while draining, so no locking is involved; producers running on other
//! threads hand batches over through a channel.

use chrono::{DateTime, TimeDelta, Utc};
use goss_result::{Outcome, ResultBatch, ResultKind};
use tracing::{debug, info};

use super::options::FormatOptions;

/// Accumulated counts and time span for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// Outcomes seen, of any kind
    pub total: usize,

    /// Outcomes with kind FAIL
    pub failed: usize,

    /// Outcomes with kind SKIP
    pub skipped: usize,

    /// Earliest start time seen (None until the first outcome)
    pub earliest_start: Option<DateTime<Utc>>,

    /// Latest end time seen (None until the first outcome)
    pub latest_end: Option<DateTime<Utc>>,

    /// Rendered failure descriptions, indexed by failure ordinal.
    /// Only populated in verbose mode.
    pub failures: Vec<String>,
}

impl Aggregate {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes that neither failed nor were skipped
    pub fn passed(&self) -> usize {
        self.total.saturating_sub(self.failed + self.skipped)
    }

    /// Latest end minus earliest start, or zero if nothing was seen.
    ///
    /// Timestamps are not validated, so a producer reporting an end before
    /// its start can yield a negative span.
    pub fn span(&self) -> TimeDelta {
        match (self.earliest_start, self.latest_end) {
            (Some(start), Some(end)) => end - start,
            _ => TimeDelta::zero(),
        }
    }

    /// Description captured for a failure ordinal, or "" if none was captured
    pub fn failure_description(&self, ordinal: usize) -> &str {
        self.failures.get(ordinal).map_or("", String::as_str)
    }

    fn observe_span(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.earliest_start = Some(match self.earliest_start {
            Some(current) => current.min(start),
            None => start,
        });
        self.latest_end = Some(match self.latest_end {
            Some(current) => current.max(end),
            None => end,
        });
    }
}

/// Drains outcomes into an [`Aggregate`]
#[derive(Debug)]
pub struct Aggregator {
    options: FormatOptions,
    aggregate: Aggregate,
    batches: usize,
}

impl Aggregator {
    /// Create an aggregator for one run
    pub fn new(options: FormatOptions) -> Self {
        Self {
            options,
            aggregate: Aggregate::new(),
            batches: 0,
        }
    }

    /// Add a single outcome
    pub fn add<O: Outcome>(&mut self, outcome: &O) {
        let agg = &mut self.aggregate;
        agg.total += 1;
        agg.observe_span(outcome.start_time(), outcome.end_time());

        match outcome.kind() {
            ResultKind::Fail => {
                if self.options.verbose {
                    let detail = outcome.humanize(true, self.options.include_raw());
                    agg.failures
                        .push(format!("Fail {} - {}\n", agg.failed + 1, detail));
                }
                agg.failed += 1;
            }
            ResultKind::Skip => agg.skipped += 1,
            ResultKind::Success | ResultKind::Other(_) => {}
        }
    }

    /// Add every outcome of a batch, in order
    pub fn add_batch<O: Outcome>(&mut self, batch: &[O]) {
        self.batches += 1;
        for outcome in batch {
            self.add(outcome);
        }
        debug!(
            batch = self.batches,
            size = batch.len(),
            total = self.aggregate.total,
            failed = self.aggregate.failed,
            "drained batch"
        );
    }

    /// Current state of the aggregate
    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    /// Consume the aggregator and hand over the aggregate
    pub fn finish(self) -> Aggregate {
        info!(
            batches = self.batches,
            total = self.aggregate.total,
            failed = self.aggregate.failed,
            skipped = self.aggregate.skipped,
            "aggregation complete"
        );
        self.aggregate
    }

    /// Drain a producer to exhaustion and return the aggregate.
    ///
    /// Blocks for as long as the producer does. A channel receiver only ends
    /// once every sender is dropped.
    pub fn drain<P, O>(mut self, producer: P) -> Aggregate
    where
        P: IntoIterator<Item = ResultBatch<O>>,
        O: Outcome,
    {
        for batch in producer {
            self.add_batch(&batch);
        }
        self.finish()
    }
}

/// Aggregate every batch a producer yields
pub fn aggregate<P, O>(producer: P, options: &FormatOptions) -> Aggregate
where
    P: IntoIterator<Item = ResultBatch<O>>,
    O: Outcome,
{
    Aggregator::new(*options).drain(producer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use goss_result::TestResult;
    use std::sync::mpsc;
    use std::thread;

    fn at_ms(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    fn result(kind: ResultKind, start_ms: i64, end_ms: i64) -> TestResult {
        TestResult::new("File", "/etc/hosts", "exists", kind, at_ms(start_ms), at_ms(end_ms))
            .with_message("Expected false to equal true")
            .with_raw(serde_json::json!(true), serde_json::json!(false))
    }

    fn verbose() -> FormatOptions {
        FormatOptions {
            verbose: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_producer() {
        let agg = aggregate(Vec::<ResultBatch>::new(), &FormatOptions::default());
        assert_eq!(agg, Aggregate::new());
        assert_eq!(agg.span(), TimeDelta::zero());
        assert_eq!(agg.passed(), 0);
    }

    #[test]
    fn test_empty_batches() {
        let agg = aggregate(vec![Vec::<TestResult>::new(), vec![]], &FormatOptions::default());
        assert_eq!(agg.total, 0);
        assert!(agg.earliest_start.is_none());
        assert_eq!(agg.span(), TimeDelta::zero());
    }

    #[test]
    fn test_counts_by_kind() {
        let batches = vec![
            vec![
                result(ResultKind::Success, 0, 10),
                result(ResultKind::Fail, 0, 10),
            ],
            vec![
                result(ResultKind::Skip, 0, 0),
                result(ResultKind::Other(5), 0, 10),
                result(ResultKind::Fail, 5, 10),
            ],
        ];
        let agg = aggregate(batches, &FormatOptions::default());

        assert_eq!(agg.total, 5);
        assert_eq!(agg.failed, 2);
        assert_eq!(agg.skipped, 1);
        assert_eq!(agg.passed(), 2);
        assert!(agg.failures.is_empty());
    }

    #[test]
    fn test_span_min_start_max_end() {
        let batches = vec![
            vec![result(ResultKind::Success, 200, 700)],
            vec![result(ResultKind::Success, 100, 300), result(ResultKind::Success, 400, 1600)],
        ];
        let agg = aggregate(batches, &FormatOptions::default());

        assert_eq!(agg.earliest_start, Some(at_ms(100)));
        assert_eq!(agg.latest_end, Some(at_ms(1600)));
        assert_eq!(agg.span(), TimeDelta::milliseconds(1500));
    }

    #[test]
    fn test_span_passes_through_inverted_timestamps() {
        let agg = aggregate(
            vec![vec![result(ResultKind::Success, 1000, 250)]],
            &FormatOptions::default(),
        );
        assert_eq!(agg.span(), TimeDelta::milliseconds(-750));
    }

    #[test]
    fn test_verbose_captures_numbered_failures() {
        let batches = vec![
            vec![result(ResultKind::Fail, 0, 1), result(ResultKind::Success, 0, 1)],
            vec![result(ResultKind::Fail, 0, 1)],
        ];
        let agg = aggregate(batches, &verbose());

        assert_eq!(agg.failures.len(), 2);
        assert!(agg.failures[0].starts_with("Fail 1 - File: /etc/hosts: exists: "));
        assert!(agg.failures[1].starts_with("Fail 2 - "));
        assert!(agg.failures.iter().all(|f| f.ends_with('\n')));
        assert!(agg.failures[0].contains("(expected: true, actual: false)"));
    }

    #[test]
    fn test_verbose_respects_exclude_raw() {
        let opts = FormatOptions {
            verbose: true,
            exclude_raw: true,
            ..Default::default()
        };
        let agg = aggregate(vec![vec![result(ResultKind::Fail, 0, 1)]], &opts);
        assert_eq!(
            agg.failures[0],
            "Fail 1 - File: /etc/hosts: exists: Expected false to equal true\n"
        );
    }

    #[test]
    fn test_failure_description_missing_is_empty() {
        let agg = Aggregate {
            total: 2,
            failed: 2,
            ..Default::default()
        };
        assert_eq!(agg.failure_description(0), "");
        assert_eq!(agg.failure_description(7), "");
    }

    #[test]
    fn test_counts_monotonic_while_draining() {
        let mut aggregator = Aggregator::new(FormatOptions::default());
        let mut last = (0, 0, 0);
        for kind in [ResultKind::Fail, ResultKind::Skip, ResultKind::Success, ResultKind::Fail] {
            aggregator.add_batch(&[result(kind, 0, 1)]);
            let agg = aggregator.aggregate();
            assert!(agg.total > last.0);
            assert!(agg.failed >= last.1);
            assert!(agg.skipped >= last.2);
            assert_eq!(agg.total, agg.passed() + agg.failed + agg.skipped);
            last = (agg.total, agg.failed, agg.skipped);
        }
    }

    #[test]
    fn test_drain_channel_from_producer_thread() {
        let (tx, rx) = mpsc::sync_channel::<ResultBatch>(2);
        let producer = thread::spawn(move || {
            for i in 0..10 {
                let kind = if i % 3 == 0 { ResultKind::Fail } else { ResultKind::Success };
                tx.send(vec![result(kind, i * 10, i * 10 + 5)]).unwrap();
            }
        });

        let agg = aggregate(rx, &verbose());
        producer.join().unwrap();

        assert_eq!(agg.total, 10);
        assert_eq!(agg.failed, 4);
        assert_eq!(agg.failures.len(), 4);
        assert!(agg.failures[3].starts_with("Fail 4 - "));
        assert_eq!(agg.span(), TimeDelta::milliseconds(95));
    }

    #[test]
    fn test_borrowed_outcomes() {
        let owned = [result(ResultKind::Skip, 0, 1), result(ResultKind::Fail, 0, 2)];
        let batches: Vec<Vec<&TestResult>> = vec![owned.iter().collect()];
        let agg = aggregate(batches, &FormatOptions::default());
        assert_eq!(agg.total, 2);
        assert_eq!(agg.skipped, 1);
        assert_eq!(agg.failed, 1);
    }
}
