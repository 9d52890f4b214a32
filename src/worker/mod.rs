//! Worker pool for parallel vanity address generation.
//!
//! This module provides:
//! - CPU workers running the generate/derive/match/emit cycle
//! - A supervisor that keeps a fixed number of workers alive and replaces
//!   faulted ones
//! - The pool and coordinator that apply count and time limits

mod cpu;
mod pool;
mod supervisor;

pub use cpu::CpuWorker;
pub use pool::{
    SearchEvent, SearchSummary, StopCondition, StopReason, WorkerPool, RESULT_QUEUE_CAPACITY,
};
pub use supervisor::{Fault, Supervisor, SupervisorStats, TaskBody};
