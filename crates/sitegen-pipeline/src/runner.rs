//! Concurrent job execution with per-job failure isolation
//!
//! Every job runs to a settled [`JobOutcome`]; a failing job is recorded,
//! never raised, so one bad generation can never stop the others or the
//! manifest write. No retries: one attempt per job per run.

use sitegen_core::Result;
use std::collections::BTreeMap;
use std::thread;

/// One unit of asset generation work: a key and a run-once action that
/// yields the public path of the produced file.
pub struct GenerationJob {
    pub key: String,
    run: Box<dyn FnOnce() -> Result<String> + Send>,
}

impl GenerationJob {
    pub fn new(
        key: impl Into<String>,
        run: impl FnOnce() -> Result<String> + Send + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            run: Box::new(run),
        }
    }
}

/// The settled result of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Fulfilled(String),
    Rejected(String),
}

impl JobOutcome {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, JobOutcome::Fulfilled(_))
    }
}

/// Run every job concurrently and collect exactly one outcome per key.
///
/// Jobs are spawned together, one thread each, and joined unordered; a
/// job's `Err` (or panic) becomes `Rejected` with the message text.
pub fn run_all(jobs: Vec<GenerationJob>) -> BTreeMap<String, JobOutcome> {
    let handles: Vec<(String, thread::JoinHandle<Result<String>>)> = jobs
        .into_iter()
        .map(|job| (job.key, thread::spawn(job.run)))
        .collect();

    let mut outcomes = BTreeMap::new();
    for (key, handle) in handles {
        let outcome = match handle.join() {
            Ok(Ok(value)) => JobOutcome::Fulfilled(value),
            Ok(Err(error)) => JobOutcome::Rejected(error.to_string()),
            Err(_) => JobOutcome::Rejected("job panicked".to_string()),
        };
        outcomes.insert(key, outcome);
    }

    outcomes
}

/// One summary line per settled job.
pub fn log_summary(outcomes: &BTreeMap<String, JobOutcome>) {
    for (key, outcome) in outcomes {
        match outcome {
            JobOutcome::Fulfilled(path) => println!("  - {}: generated -> {}", key, path),
            JobOutcome::Rejected(reason) => println!("  - {}: failed -> {}", key, reason),
        }
    }
}
