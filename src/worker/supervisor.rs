//! Admission gate that keeps a fixed number of search tasks alive.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use tracing::{debug, error, info, warn};

/// How often the supervisor re-checks the stop flag while no task exits.
const EXIT_POLL: Duration = Duration::from_millis(50);

/// Why a task ended abnormally.
#[derive(Debug, thiserror::Error)]
pub enum Fault {
    /// The task body panicked; the panic was caught at the task boundary.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// An internal consistency check failed.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Nobody is receiving results any more.
    #[error("result channel closed")]
    ResultsClosed,
}

/// The body each task thread runs; receives the task id.
pub type TaskBody = Arc<dyn Fn(usize) -> Result<(), Fault> + Send + Sync>;

/// Sent by every task thread when it ends, however it ends.
#[derive(Debug)]
struct TaskExit {
    id: usize,
    outcome: Result<(), Fault>,
}

/// Lifetime counters for the supervised tasks.
#[derive(Debug, Default)]
pub struct SupervisorStats {
    spawned: AtomicU64,
    faults: AtomicU64,
}

impl SupervisorStats {
    /// Tasks started, including replacements.
    pub fn spawned(&self) -> u64 {
        self.spawned.load(Ordering::Relaxed)
    }

    /// Tasks that ended with a [`Fault`].
    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}

/// Runs `max_concurrency` copies of a task body, replacing each one as it ends
/// until the stop flag is set.
///
/// Joining the supervisor waits for every task it started.
pub struct Supervisor {
    handle: Option<JoinHandle<()>>,
    stats: Arc<SupervisorStats>,
}

impl Supervisor {
    /// Starts the supervisor thread, which immediately fills every slot.
    pub fn spawn(
        max_concurrency: usize,
        stop_flag: Arc<AtomicBool>,
        body: TaskBody,
    ) -> io::Result<Self> {
        let stats = Arc::new(SupervisorStats::default());
        let max_concurrency = max_concurrency.max(1);

        let handle = {
            let stats = stats.clone();
            thread::Builder::new()
                .name("vanity-supervisor".into())
                .spawn(move || supervise(max_concurrency, stop_flag, body, stats))?
        };

        Ok(Self {
            handle: Some(handle),
            stats,
        })
    }

    pub fn stats(&self) -> &Arc<SupervisorStats> {
        &self.stats
    }

    /// Waits for the supervisor and all of its tasks. The stop flag must be set
    /// by the caller, or this blocks forever.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("supervisor thread panicked");
            }
        }
    }
}

fn supervise(
    max_concurrency: usize,
    stop_flag: Arc<AtomicBool>,
    body: TaskBody,
    stats: Arc<SupervisorStats>,
) {
    let (exit_tx, exit_rx) = unbounded::<TaskExit>();
    let mut live = 0usize;
    let mut next_id = 0usize;

    info!(max_concurrency, "search supervisor started");

    loop {
        while live < max_concurrency && !stop_flag.load(Ordering::Relaxed) {
            match spawn_task(next_id, body.clone(), exit_tx.clone()) {
                Ok(()) => {
                    debug!(task = next_id, "search task started");
                    stats.spawned.fetch_add(1, Ordering::Relaxed);
                    live += 1;
                    next_id += 1;
                }
                Err(e) => {
                    error!(error = %e, "failed to spawn search task; stopping search");
                    stop_flag.store(true, Ordering::Relaxed);
                }
            }
        }

        if live == 0 {
            break;
        }

        match exit_rx.recv_timeout(EXIT_POLL) {
            Ok(exit) => {
                live -= 1;
                match exit.outcome {
                    Ok(()) => debug!(task = exit.id, "search task finished"),
                    Err(Fault::ResultsClosed) => {
                        warn!(task = exit.id, "result consumer is gone; stopping search");
                        stop_flag.store(true, Ordering::Relaxed);
                    }
                    Err(fault) => {
                        stats.faults.fetch_add(1, Ordering::Relaxed);
                        warn!(task = exit.id, %fault, "search task faulted; recycling slot");
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            // exit_tx is held here, so the channel cannot disconnect
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(tasks = next_id, "search supervisor stopped");
}

fn spawn_task(id: usize, body: TaskBody, exit_tx: Sender<TaskExit>) -> io::Result<()> {
    thread::Builder::new()
        .name(format!("vanity-worker-{}", id))
        .spawn(move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| body(id))) {
                Ok(outcome) => outcome,
                Err(payload) => Err(Fault::Panicked(panic_message(payload.as_ref()))),
            };
            let _ = exit_tx.send(TaskExit { id, outcome });
        })
        .map(|_| ())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}
