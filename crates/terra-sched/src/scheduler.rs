//! Time-budgeted executor for `[0, len)` index ranges.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::YieldPoint;

/// Ranges shorter than this run in a single synchronous pass.
pub const DEFAULT_SYNC_THRESHOLD: usize = 50_000;

/// Wall-clock time one slice may consume before yielding (one 60 Hz frame).
pub const DEFAULT_SLICE_BUDGET: Duration = Duration::from_millis(16);

/// Scheduling policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Index count at or above which work is sliced.
    pub sync_threshold: usize,
    /// Maximum time per slice. A slice ends after the first index that
    /// brings elapsed time to or past this budget.
    pub slice_budget: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sync_threshold: DEFAULT_SYNC_THRESHOLD,
            slice_budget: DEFAULT_SLICE_BUDGET,
        }
    }
}

/// How a range was executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One uninterrupted pass.
    Synchronous,
    /// Budgeted slices separated by host yields.
    Chunked,
}

/// Summary of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkReport {
    /// Number of indices processed (always the full range on completion).
    pub processed: usize,
    /// Number of slices executed. A synchronous run counts as one.
    pub slices: u32,
    /// Which policy branch was taken.
    pub mode: ExecutionMode,
}

/// Runs a per-index operation over `[0, len)` exactly once per index, in
/// ascending order, yielding to the host between budgeted slices.
///
/// There is no cancellation token: dropping the returned future abandons the
/// remaining indices, and those already processed keep their side effects.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkedScheduler {
    config: SchedulerConfig,
}

impl ChunkedScheduler {
    /// Create a scheduler with the given policy.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// The active policy.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Which branch a range of `len` indices will take.
    pub fn mode_for(&self, len: usize) -> ExecutionMode {
        if len < self.config.sync_threshold {
            ExecutionMode::Synchronous
        } else {
            ExecutionMode::Chunked
        }
    }

    /// Run `op` for every index in `[0, len)`.
    pub async fn run<Y, F>(&self, len: usize, host: &mut Y, op: F) -> ChunkReport
    where
        Y: YieldPoint,
        F: FnMut(usize),
    {
        self.run_with_progress(len, host, op, |_| {}).await
    }

    /// Run `op` for every index in `[0, len)`, reporting the completed
    /// fraction after each slice.
    ///
    /// `progress` receives non-decreasing values in `[0, 1]`, the last of
    /// which is exactly `1.0`. The returned future resolves once, after the
    /// final index.
    pub async fn run_with_progress<Y, F, P>(
        &self,
        len: usize,
        host: &mut Y,
        mut op: F,
        mut progress: P,
    ) -> ChunkReport
    where
        Y: YieldPoint,
        F: FnMut(usize),
        P: FnMut(f32),
    {
        if self.mode_for(len) == ExecutionMode::Synchronous {
            for index in 0..len {
                op(index);
            }
            progress(1.0);
            return ChunkReport {
                processed: len,
                slices: 1,
                mode: ExecutionMode::Synchronous,
            };
        }

        let started = Instant::now();
        let budget = self.config.slice_budget;
        let mut index = 0;
        let mut slices = 0u32;

        while index < len {
            let slice_start = Instant::now();
            slices += 1;

            while index < len {
                op(index);
                index += 1;
                if slice_start.elapsed() >= budget {
                    break;
                }
            }

            progress(index as f32 / len as f32);

            if index < len {
                trace!(index, len, slices, "slice budget spent, yielding to host");
                host.next_frame().await;
            }
        }

        debug!(
            len,
            slices,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "chunked run complete"
        );

        ChunkReport {
            processed: len,
            slices,
            mode: ExecutionMode::Chunked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::YieldNow;

    /// Counts how often the scheduler suspended.
    #[derive(Default)]
    struct CountingYield {
        yields: u32,
    }

    impl YieldPoint for CountingYield {
        async fn next_frame(&mut self) {
            self.yields += 1;
            crate::yield_now().await;
        }
    }

    fn zero_budget(threshold: usize) -> ChunkedScheduler {
        ChunkedScheduler::new(SchedulerConfig {
            sync_threshold: threshold,
            slice_budget: Duration::ZERO,
        })
    }

    #[test]
    fn test_default_policy() {
        let config = SchedulerConfig::default();
        assert_eq!(config.sync_threshold, 50_000);
        assert_eq!(config.slice_budget, Duration::from_millis(16));
    }

    #[test]
    fn test_mode_selection_at_threshold() {
        let sched = ChunkedScheduler::default();
        assert_eq!(sched.mode_for(0), ExecutionMode::Synchronous);
        assert_eq!(sched.mode_for(49_999), ExecutionMode::Synchronous);
        assert_eq!(sched.mode_for(50_000), ExecutionMode::Chunked);
    }

    #[test]
    fn test_small_range_runs_synchronously_without_yielding() {
        let sched = ChunkedScheduler::default();
        let mut host = CountingYield::default();
        let mut visited = Vec::new();

        let report = pollster::block_on(sched.run(100, &mut host, |i| visited.push(i)));

        assert_eq!(report.mode, ExecutionMode::Synchronous);
        assert_eq!(report.slices, 1);
        assert_eq!(host.yields, 0);
        assert_eq!(visited, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_range_completes() {
        let sched = zero_budget(0);
        let mut host = CountingYield::default();
        let mut calls = 0;
        let mut last_progress = None;

        let report = pollster::block_on(sched.run_with_progress(
            0,
            &mut host,
            |_| calls += 1,
            |p| last_progress = Some(p),
        ));

        assert_eq!(calls, 0);
        assert_eq!(report.processed, 0);
        assert_eq!(host.yields, 0);
        assert_eq!(report.slices, 0);
        assert_eq!(last_progress, None);
    }

    #[test]
    fn test_zero_budget_yields_between_every_index() {
        let sched = zero_budget(10);
        let mut host = CountingYield::default();
        let mut visited = Vec::new();

        let report = pollster::block_on(sched.run(25, &mut host, |i| visited.push(i)));

        assert_eq!(report.mode, ExecutionMode::Chunked);
        assert_eq!(report.slices, 25);
        assert_eq!(host.yields, 24, "no yield after the final slice");
        assert_eq!(visited, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_each_index_exactly_once_in_order() {
        let sched = zero_budget(1);
        let mut host = YieldNow;
        let mut counts = vec![0u8; 500];
        let mut last = None;

        pollster::block_on(sched.run(500, &mut host, |i| {
            counts[i] += 1;
            if let Some(prev) = last {
                assert!(i > prev, "index {i} after {prev}");
            }
            last = Some(i);
        }));

        assert!(counts.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_progress_is_monotonic_and_finishes_at_one() {
        let sched = zero_budget(1);
        let mut host = YieldNow;
        let mut reports = Vec::new();

        pollster::block_on(sched.run_with_progress(200, &mut host, |_| {}, |p| reports.push(p)));

        assert!(!reports.is_empty());
        assert!(reports.windows(2).all(|w| w[0] <= w[1]));
        assert!(reports.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(*reports.last().unwrap(), 1.0);
    }

    #[test]
    fn test_synchronous_progress_reports_once() {
        let sched = ChunkedScheduler::default();
        let mut host = YieldNow;
        let mut reports = Vec::new();

        pollster::block_on(sched.run_with_progress(10, &mut host, |_| {}, |p| reports.push(p)));

        assert_eq!(reports, vec![1.0]);
    }

    #[test]
    fn test_chunked_matches_synchronous_loop() {
        let n = 60_000;
        let kernel = |i: usize| ((i as u64).wrapping_mul(2_654_435_761) % 1_000_003) as f32 * 0.5;

        let mut expected = vec![0.0f32; n];
        for (i, slot) in expected.iter_mut().enumerate() {
            *slot = kernel(i);
        }

        let sched = ChunkedScheduler::new(SchedulerConfig {
            sync_threshold: 50_000,
            slice_budget: Duration::from_micros(50),
        });
        let mut host = CountingYield::default();
        let mut actual = vec![0.0f32; n];

        let report = pollster::block_on(sched.run(n, &mut host, |i| actual[i] = kernel(i)));

        assert_eq!(report.mode, ExecutionMode::Chunked);
        assert_eq!(report.processed, n);
        assert_eq!(host.yields, report.slices - 1);
        assert_eq!(actual, expected);
    }
}
