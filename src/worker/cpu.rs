//! CPU-based worker for vanity address generation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{SendTimeoutError, Sender};
use tracing::debug;

use crate::crypto::Account;
use crate::matcher::Matcher;
use crate::result::VanityResult;

use super::Fault;

/// How long a blocked send waits before re-checking the stop flag.
const SEND_POLL: Duration = Duration::from_millis(20);

/// A CPU worker that generates accounts and tests them.
pub struct CpuWorker {
    /// Worker ID
    id: usize,
    matcher: Matcher,
    /// Channel to send results
    result_tx: Sender<VanityResult>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
}

impl CpuWorker {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        matcher: Matcher,
        result_tx: Sender<VanityResult>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            matcher,
            result_tx,
            stop_flag,
        }
    }

    /// Runs cycles until the stop flag is observed or a cycle faults.
    ///
    /// The flag is checked once per cycle, so a worker stops within one
    /// generate/derive/match step of the signal.
    pub fn run(&self) -> Result<(), Fault> {
        while !self.stop_flag.load(Ordering::Relaxed) {
            self.cycle()?;
        }
        Ok(())
    }

    /// One generate -> derive -> match -> emit step.
    pub fn cycle(&self) -> Result<(), Fault> {
        let account = Account::generate();

        if let Some(result) = self.matcher.evaluate(&account) {
            self.check(&result)?;
            self.emit(result)?;
        }

        Ok(())
    }

    fn check(&self, result: &VanityResult) -> Result<(), Fault> {
        if result.private.is_none() {
            return Err(Fault::Invariant("generated account has no key".into()));
        }

        let config = self.matcher.config();
        if config.list_contracts {
            let listed = result.contracts.as_ref().map_or(0, |c| c.len());
            if listed != config.contract_depth {
                return Err(Fault::Invariant(format!(
                    "listed {} contracts, expected {}",
                    listed, config.contract_depth
                )));
            }
        }

        Ok(())
    }

    /// Pushes a result, blocking while the queue is full.
    ///
    /// Results that are still blocked when the search is stopped are dropped.
    fn emit(&self, mut result: VanityResult) -> Result<(), Fault> {
        loop {
            match self.result_tx.send_timeout(result, SEND_POLL) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(pending)) => {
                    if self.stop_flag.load(Ordering::Relaxed) {
                        debug!(worker = self.id, "search stopped with result pending");
                        return Ok(());
                    }
                    result = pending;
                }
                Err(SendTimeoutError::Disconnected(_)) => return Err(Fault::ResultsClosed),
            }
        }
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::SearchCounter;
    use crate::matcher::{MatchConfig, Pattern};
    use crossbeam_channel::bounded;

    fn make_worker(
        config: MatchConfig,
        capacity: usize,
    ) -> (CpuWorker, crossbeam_channel::Receiver<VanityResult>) {
        let (tx, rx) = bounded(capacity);
        let matcher = Matcher::new(config, Arc::new(SearchCounter::new()));
        let stop = Arc::new(AtomicBool::new(false));
        (CpuWorker::new(0, matcher, tx, stop), rx)
    }

    #[test]
    fn test_cycle_emits_match() {
        let (worker, rx) = make_worker(MatchConfig::default(), 4);
        worker.cycle().unwrap();
        let result = rx.try_recv().unwrap();
        assert!(result.private.is_some());
        assert!(result.public.is_some());
    }

    #[test]
    fn test_cycle_no_match_emits_nothing() {
        let config = MatchConfig {
            pattern: Pattern::parse("zz", false).unwrap(),
            ..Default::default()
        };
        let (worker, rx) = make_worker(config, 4);
        worker.cycle().unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(worker.matcher.counter().drain_and_reset(), 1);
    }

    #[test]
    fn test_listing_reports_full_depth() {
        let config = MatchConfig {
            list_contracts: true,
            contract_depth: 3,
            ..Default::default()
        };
        let (worker, rx) = make_worker(config, 4);
        worker.cycle().unwrap();
        assert_eq!(rx.try_recv().unwrap().contracts.unwrap().len(), 3);
    }

    #[test]
    fn test_closed_channel_is_fault() {
        let (worker, rx) = make_worker(MatchConfig::default(), 4);
        drop(rx);
        assert!(matches!(worker.cycle(), Err(Fault::ResultsClosed)));
    }

    #[test]
    fn test_full_queue_releases_on_stop() {
        let (worker, rx) = make_worker(MatchConfig::default(), 1);
        worker.cycle().unwrap();
        worker.stop_flag.store(true, Ordering::Relaxed);
        // Queue is full; the blocked send gives up once stopped.
        worker.cycle().unwrap();
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_full_queue_blocks_then_delivers() {
        let (worker, rx) = make_worker(MatchConfig::default(), 1);
        worker.cycle().unwrap();
        assert_eq!(rx.len(), 1);

        let worker = Arc::new(worker);
        let producer = {
            let worker = worker.clone();
            std::thread::spawn(move || worker.cycle())
        };

        // Still waiting for room, with nothing dropped.
        std::thread::sleep(Duration::from_millis(200));
        assert!(!producer.is_finished());
        assert_eq!(rx.len(), 1);

        let first = rx.recv().unwrap();
        producer.join().unwrap().unwrap();
        let second = rx.try_recv().unwrap();
        assert_ne!(first.address, second.address);
    }

    #[test]
    fn test_run_exits_when_stopped() {
        let (worker, _rx) = make_worker(MatchConfig::default(), 1);
        worker.stop_flag.store(true, Ordering::Relaxed);
        assert!(worker.run().is_ok());
    }
}
