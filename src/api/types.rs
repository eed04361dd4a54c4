//! Shared types for the API layer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::alerts::ProactiveAlert;
use crate::core_state::CoreState;
use crate::batch::BatchOptions;
use crate::models::{AnalysisOptions, AnalysisRequest, AnalysisResult, PatientRecord};
use crate::render::RenderedReport;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

// ═══════════════════════════════════════════════════════════
// Request / response bodies
// ═══════════════════════════════════════════════════════════

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    #[serde(flatten)]
    pub request: AnalysisRequest,
    /// Label stored with the history entry.
    #[serde(default)]
    pub patient_label: String,
    #[serde(default = "default_true")]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Set when the result was saved to history.
    pub history_id: Option<String>,
    pub result: AnalysisResult,
    pub alerts: Vec<ProactiveAlert>,
    pub report: RenderedReport,
}

#[derive(Debug, Serialize)]
pub struct BatchAccepted {
    pub job_id: String,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
    pub records: Vec<PatientRecord>,
    #[serde(default)]
    pub options: BatchBodyOptions,
}

/// Batch options as sent by the client. Omitted fields take server defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BatchBodyOptions {
    pub concurrency: Option<usize>,
    pub analysis: AnalysisOptions,
    pub save_to_history: bool,
}

impl BatchBodyOptions {
    /// `default_concurrency` applies when the client did not pick one.
    pub fn into_batch_options(self, default_concurrency: usize) -> BatchOptions {
        BatchOptions {
            concurrency: self.concurrency.unwrap_or(default_concurrency),
            analysis: self.analysis,
            save_to_history: self.save_to_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_body_defaults_to_saving() {
        let body: AnalyzeBody =
            serde_json::from_str(r#"{"profile":{"medications":["Warfarin"]}}"#).unwrap();
        assert!(body.save);
        assert_eq!(body.request.profile.medications, vec!["Warfarin"]);
        assert_eq!(body.request.options.language, "en");
    }

    #[test]
    fn batch_concurrency_defaults_to_configured_value() {
        let body: BatchBody =
            serde_json::from_str(r#"{"records":[],"options":{"save_to_history":true}}"#).unwrap();
        let options = body.options.into_batch_options(7);
        assert_eq!(options.concurrency, 7);
        assert!(options.save_to_history);

        let body: BatchBody = serde_json::from_str(r#"{"records":[]}"#).unwrap();
        assert_eq!(body.options.into_batch_options(7).concurrency, 7);

        let body: BatchBody =
            serde_json::from_str(r#"{"records":[],"options":{"concurrency":2}}"#).unwrap();
        let options = body.options.into_batch_options(7);
        assert_eq!(options.concurrency, 2);
        assert!(!options.save_to_history);
    }

    #[test]
    fn analyze_body_can_opt_out() {
        let body: AnalyzeBody = serde_json::from_str(
            r#"{"profile":{"medications":["Warfarin"]},"options":{"language":"fr"},"save":false,"patient_label":"Ward 3"}"#,
        )
        .unwrap();
        assert!(!body.save);
        assert_eq!(body.patient_label, "Ward 3");
        assert_eq!(body.request.options.language, "fr");
    }
}
