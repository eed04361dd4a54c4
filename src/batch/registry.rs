use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::PatientRecord;

use super::runner::BatchRunner;
use super::tracker::BatchTracker;
use super::types::{BatchOptions, BatchSnapshot};

/// Finished jobs kept for polling before the oldest are dropped.
pub const MAX_RETAINED_JOBS: usize = 64;

/// In-memory registry of background batch jobs, keyed by job id.
#[derive(Default)]
pub struct BatchRegistry {
    jobs: RwLock<HashMap<String, BatchTracker>>,
}

impl BatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job and run it on the tokio runtime. Returns the job id
    /// immediately; progress is read back through [`BatchRegistry::snapshot`].
    pub fn submit(
        &self,
        runner: BatchRunner,
        records: Vec<PatientRecord>,
        options: BatchOptions,
    ) -> String {
        let job_id = Uuid::new_v4().to_string();
        let tracker = BatchTracker::new(&job_id, records);

        {
            let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
            prune_finished(&mut jobs);
            jobs.insert(job_id.clone(), tracker.clone());
        }

        tokio::spawn(async move {
            runner.run(&tracker, &options).await;
        });
        job_id
    }

    pub fn snapshot(&self, job_id: &str) -> Option<BatchSnapshot> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(job_id)
            .map(BatchTracker::snapshot)
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop the oldest finished jobs once the registry is over capacity.
/// Running jobs are never dropped.
fn prune_finished(jobs: &mut HashMap<String, BatchTracker>) {
    if jobs.len() < MAX_RETAINED_JOBS {
        return;
    }
    let mut finished: Vec<(String, DateTime<Utc>)> = jobs
        .iter()
        .filter_map(|(id, t)| t.finished_at().map(|at| (id.clone(), at)))
        .collect();
    finished.sort_by_key(|(_, at)| *at);
    let excess = jobs.len() + 1 - MAX_RETAINED_JOBS;
    for (id, _) in finished.into_iter().take(excess) {
        jobs.remove(&id);
    }
}
