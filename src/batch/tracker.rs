use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::alerts::ProactiveAlert;
use crate::models::{AnalysisResult, PatientRecord, RiskLevel};

use super::types::{BatchItem, BatchSnapshot, BatchSummary, ItemStatus};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TransitionError {
    #[error("No batch item at index {0}")]
    UnknownIndex(usize),

    #[error("Item {index} cannot move from {from} to {to}")]
    Invalid {
        index: usize,
        from: &'static str,
        to: &'static str,
    },
}

struct TrackerState {
    job_id: String,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    items: Vec<BatchItem>,
}

impl TrackerState {
    fn transition(
        &mut self,
        index: usize,
        expected: ItemStatus,
        next: ItemStatus,
    ) -> Result<&mut BatchItem, TransitionError> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(TransitionError::UnknownIndex(index))?;
        if item.status != expected {
            return Err(TransitionError::Invalid {
                index,
                from: item.status.as_str(),
                to: next.as_str(),
            });
        }
        item.status = next;
        Ok(item)
    }

    fn count(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }
}

/// Shared, thread-safe view of a batch run.
///
/// Only `Pending → Analyzing → {Completed | Error}` moves are accepted; any
/// other move is refused and leaves the item untouched. Clones share state.
#[derive(Clone)]
pub struct BatchTracker {
    inner: Arc<Mutex<TrackerState>>,
}

impl BatchTracker {
    pub fn new(job_id: &str, records: Vec<PatientRecord>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerState {
                job_id: job_id.to_string(),
                created_at: Utc::now(),
                finished_at: None,
                items: records.into_iter().map(BatchItem::pending).collect(),
            })),
        }
    }

    /// A worker panicking mid-update must not take the job view down with it.
    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn job_id(&self) -> String {
        self.state().job_id.clone()
    }

    pub fn len(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record for `index`, as submitted.
    pub fn record(&self, index: usize) -> Option<PatientRecord> {
        self.state().items.get(index).map(|i| i.record.clone())
    }

    /// Pending → Analyzing.
    pub fn start(&self, index: usize) -> Result<(), TransitionError> {
        let mut state = self.state();
        let item = state.transition(index, ItemStatus::Pending, ItemStatus::Analyzing)?;
        item.started_at = Some(Utc::now());
        Ok(())
    }

    /// Analyzing → Completed.
    pub fn complete(
        &self,
        index: usize,
        result: AnalysisResult,
        alerts: Vec<ProactiveAlert>,
        history_id: Option<String>,
    ) -> Result<(), TransitionError> {
        let mut state = self.state();
        let item = state.transition(index, ItemStatus::Analyzing, ItemStatus::Completed)?;
        item.result = Some(result);
        item.alerts = alerts;
        item.history_id = history_id;
        item.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Analyzing → Error.
    pub fn fail(&self, index: usize, error: &str) -> Result<(), TransitionError> {
        let mut state = self.state();
        let item = state.transition(index, ItemStatus::Analyzing, ItemStatus::Error)?;
        item.error = Some(error.to_string());
        item.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Force every non-terminal item to `Error`. Used when a worker died
    /// without reporting, so the job still resolves.
    pub fn abandon_unfinished(&self, reason: &str) -> usize {
        let mut state = self.state();
        let now = Utc::now();
        let mut abandoned = 0;
        for item in state.items.iter_mut().filter(|i| !i.status.is_terminal()) {
            item.status = ItemStatus::Error;
            item.error = Some(reason.to_string());
            item.started_at.get_or_insert(now);
            item.finished_at = Some(now);
            abandoned += 1;
        }
        abandoned
    }

    /// True once every item is terminal.
    pub fn all_terminal(&self) -> bool {
        self.state().items.iter().all(|i| i.status.is_terminal())
    }

    pub fn mark_finished(&self) {
        self.state().finished_at.get_or_insert_with(Utc::now);
    }

    pub fn is_finished(&self) -> bool {
        self.state().finished_at.is_some()
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.state().finished_at
    }

    pub fn summary(&self, duration_ms: u64) -> BatchSummary {
        let state = self.state();
        BatchSummary {
            total: state.items.len(),
            completed: state.count(ItemStatus::Completed),
            failed: state.count(ItemStatus::Error),
            high_risk: state
                .items
                .iter()
                .filter(|i| {
                    i.result
                        .as_ref()
                        .is_some_and(|r| r.overall_risk == RiskLevel::High)
                })
                .count(),
            duration_ms,
        }
    }

    pub fn snapshot(&self) -> BatchSnapshot {
        let state = self.state();
        BatchSnapshot {
            job_id: state.job_id.clone(),
            total: state.items.len(),
            pending: state.count(ItemStatus::Pending),
            analyzing: state.count(ItemStatus::Analyzing),
            completed: state.count(ItemStatus::Completed),
            failed: state.count(ItemStatus::Error),
            finished: state.finished_at.is_some(),
            created_at: state.created_at,
            finished_at: state.finished_at,
            items: state.items.clone(),
        }
    }
}
