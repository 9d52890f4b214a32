//! Worker pool management and the search coordinator.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use tracing::info;

use crate::matcher::Matcher;
use crate::result::VanityResult;

use super::cpu::CpuWorker;
use super::supervisor::{Supervisor, SupervisorStats, TaskBody};

/// Pending results the queue holds before producers block.
pub const RESULT_QUEUE_CAPACITY: usize = 10_000;

/// Longest the coordinator waits before re-checking the stop flag.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// When a search run ends.
///
/// With neither limit set the run stops after one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopCondition {
    pub max_results: Option<usize>,
    pub time_limit: Option<Duration>,
}

impl StopCondition {
    /// Builds a stop condition; a count of zero means "no count limit".
    pub fn new(count: usize, time_limit: Option<Duration>) -> Self {
        let max_results = match (count, time_limit) {
            (0, None) => Some(1),
            (0, Some(_)) => None,
            (n, _) => Some(n),
        };
        Self {
            max_results,
            time_limit,
        }
    }

    /// Stop after `n` results.
    pub fn count(n: usize) -> Self {
        Self::new(n, None)
    }

    /// Stop once `limit` has elapsed.
    pub fn timed(limit: Duration) -> Self {
        Self::new(0, Some(limit))
    }
}

impl Default for StopCondition {
    fn default() -> Self {
        Self::new(0, None)
    }
}

/// Delivered to the consumer while a search runs.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A matching account
    Found(VanityResult),
    /// Attempts since the previous rate event
    Rate(u64),
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    CountReached,
    TimeElapsed,
    /// The stop flag was set from outside (e.g. Ctrl-C)
    Stopped,
    /// Every producer went away
    Exhausted,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy)]
pub struct SearchSummary {
    pub found: usize,
    pub total_searches: u64,
    pub elapsed: Duration,
    pub reason: StopReason,
}

/// Manages a pool of workers for parallel vanity address generation.
pub struct WorkerPool {
    /// Number of concurrent workers
    num_workers: usize,
    matcher: Matcher,
    supervisor: Option<Supervisor>,
    /// Channel receiver for results
    result_rx: Receiver<VanityResult>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Start time
    start_time: Instant,
}

impl WorkerPool {
    /// Creates a new worker pool with the specified number of workers.
    pub fn new(num_workers: usize, matcher: Matcher) -> io::Result<Self> {
        Self::with_stop_flag(num_workers, matcher, Arc::new(AtomicBool::new(false)))
    }

    /// Creates a pool that also stops when `stop_flag` is set by the caller.
    pub fn with_stop_flag(
        num_workers: usize,
        matcher: Matcher,
        stop_flag: Arc<AtomicBool>,
    ) -> io::Result<Self> {
        let num_workers = num_workers.max(1);
        let (result_tx, result_rx) = bounded(RESULT_QUEUE_CAPACITY);

        let config = matcher.config();
        info!(
            workers = num_workers,
            pattern = %config.pattern,
            main = config.search_main,
            contracts = config.search_contracts,
            depth = config.contract_depth,
            "starting search"
        );

        let body: TaskBody = {
            let matcher = matcher.clone();
            let stop_flag = stop_flag.clone();
            // The pool keeps no sender, so the channel closes once every task is gone.
            Arc::new(move |id| {
                CpuWorker::new(id, matcher.clone(), result_tx.clone(), stop_flag.clone()).run()
            })
        };

        let supervisor = Supervisor::spawn(num_workers, stop_flag.clone(), body)?;

        Ok(Self {
            num_workers,
            matcher,
            supervisor: Some(supervisor),
            result_rx,
            stop_flag,
            start_time: Instant::now(),
        })
    }

    /// Waits for a result with optional timeout.
    ///
    /// Returns `Some(result)` if a match is found, `None` if timeout expires.
    pub fn wait_for_result(&self, timeout: Duration) -> Option<VanityResult> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    /// Attempts to receive a result without blocking.
    pub fn try_recv(&self) -> Option<VanityResult> {
        self.result_rx.try_recv().ok()
    }

    /// Returns an iterator over results (blocking). Ends after the pool stops
    /// and the remaining results are drained.
    pub fn results(&self) -> impl Iterator<Item = VanityResult> + '_ {
        self.result_rx.iter()
    }

    /// Signals all workers to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops the pool and waits for every worker to exit.
    pub fn join(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop();
        if let Some(mut supervisor) = self.supervisor.take() {
            supervisor.join();
            info!(
                searches = self.matcher.counter().total(),
                elapsed_ms = self.elapsed().as_millis() as u64,
                "search stopped"
            );
        }
    }

    /// Drives the pool until `condition` is met or the stop flag is set.
    ///
    /// Results are delivered in arrival order. When `report_interval` is given,
    /// a [`SearchEvent::Rate`] with the drained counter value is delivered
    /// once per interval. All workers have exited when this returns.
    pub fn run<F>(
        mut self,
        condition: StopCondition,
        report_interval: Option<Duration>,
        mut on_event: F,
    ) -> SearchSummary
    where
        F: FnMut(SearchEvent),
    {
        let deadline = condition.time_limit.map(|limit| self.start_time + limit);
        let mut next_report = report_interval.map(|interval| Instant::now() + interval);
        let mut found = 0usize;

        let reason = loop {
            if self.is_stopped() {
                break StopReason::Stopped;
            }

            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                break StopReason::TimeElapsed;
            }

            if let (Some(at), Some(interval)) = (next_report, report_interval) {
                if now >= at {
                    on_event(SearchEvent::Rate(self.drain_and_reset_counter()));
                    next_report = Some(now + interval);
                }
            }

            let wait = [deadline, next_report]
                .into_iter()
                .flatten()
                .map(|t| t.saturating_duration_since(now))
                .fold(IDLE_POLL, Duration::min);

            match self.result_rx.recv_timeout(wait) {
                Ok(result) => {
                    found += 1;
                    on_event(SearchEvent::Found(result));
                    if condition.max_results.is_some_and(|n| found >= n) {
                        break StopReason::CountReached;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break StopReason::Exhausted,
            }
        };

        let elapsed = self.elapsed();
        self.shutdown();

        SearchSummary {
            found,
            total_searches: self.total_searches(),
            elapsed,
            reason,
        }
    }

    /// Returns the number of concurrent workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the matcher shared by every worker.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Addresses tested since the last drain; resets the count.
    pub fn drain_and_reset_counter(&self) -> u64 {
        self.matcher.counter().drain_and_reset()
    }

    /// Returns the total addresses tested across all workers.
    pub fn total_searches(&self) -> u64 {
        self.matcher.counter().total()
    }

    /// Task spawn and fault counters, while the pool is running.
    pub fn supervisor_stats(&self) -> Option<Arc<SupervisorStats>> {
        self.supervisor.as_ref().map(|s| s.stats().clone())
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
