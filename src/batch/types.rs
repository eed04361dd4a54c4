use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alerts::ProactiveAlert;
use crate::models::{AnalysisOptions, AnalysisResult, PatientRecord, RiskLevel};

// ═══════════════════════════════════════════
// Item status
// ═══════════════════════════════════════════

/// Lifecycle of one record: Pending → Analyzing → {Completed | Error}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Analyzing,
    Completed,
    Error,
}

impl ItemStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

/// One record in a batch with whatever the run has produced for it so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub record: PatientRecord,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    #[serde(default)]
    pub alerts: Vec<ProactiveAlert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the completed result was saved to history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_id: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl BatchItem {
    pub fn pending(record: PatientRecord) -> Self {
        Self {
            record,
            status: ItemStatus::Pending,
            result: None,
            alerts: Vec::new(),
            error: None,
            history_id: None,
            started_at: None,
            finished_at: None,
        }
    }
}

// ═══════════════════════════════════════════
// Options, summary, snapshot
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Number of concurrent workers. Clamped to 1..=records.
    pub concurrency: usize,
    pub analysis: AnalysisOptions,
    /// Save each completed result to the caller's history.
    pub save_to_history: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: crate::config::DEFAULT_BATCH_CONCURRENCY,
            analysis: AnalysisOptions::default(),
            save_to_history: false,
        }
    }
}

/// Worker count for `records` items: `0` counts as 1, never more than the
/// number of records.
pub fn effective_concurrency(requested: usize, records: usize) -> usize {
    requested.max(1).min(records.max(1))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub high_risk: usize,
    pub duration_ms: u64,
}

/// Point-in-time view of a job, served to polling clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSnapshot {
    pub job_id: String,
    pub total: usize,
    pub pending: usize,
    pub analyzing: usize,
    pub completed: usize,
    pub failed: usize,
    pub finished: bool,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub items: Vec<BatchItem>,
}

impl BatchSnapshot {
    pub fn high_risk_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| {
                i.result
                    .as_ref()
                    .is_some_and(|r| r.overall_risk == RiskLevel::High)
            })
            .count()
    }
}

// ═══════════════════════════════════════════
// Progress events
// ═══════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchEvent {
    ItemStarted {
        index: usize,
        record_id: String,
    },
    ItemCompleted {
        index: usize,
        record_id: String,
        overall_risk: RiskLevel,
    },
    ItemFailed {
        index: usize,
        record_id: String,
        error: String,
    },
    Finished {
        summary: BatchSummary,
    },
}
