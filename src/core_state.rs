//! Application state shared by every request handler.
//!
//! Built once at startup from [`AppConfig`] and wrapped in an `Arc`.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::alerts::ProactiveAlertMatcher;
use crate::analysis::{AnalysisError, GeminiClient, InteractionAnalyzer, LlmClient};
use crate::batch::{BatchRegistry, BatchRunner, HistorySink};
use crate::config::AppConfig;
use crate::storage::{
    HistoryStore, LocalHistoryStore, PersistenceAdapter, RemoteHistoryStore, StorageError,
    UserContext,
};
use crate::suggestions::{RemoteSuggestionSource, RxNavSource, SuggestionConfig, SuggestionEngine};

/// Timeout for autocomplete and document store calls, which sit on the
/// typing path and must stay short.
const AUXILIARY_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage initialization failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Analysis client initialization failed: {0}")]
    Analysis(#[from] AnalysisError),
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: AppConfig,
    pub analyzer: InteractionAnalyzer,
    pub matcher: ProactiveAlertMatcher,
    pub suggestions: SuggestionEngine,
    pub history: Arc<PersistenceAdapter>,
    pub batches: BatchRegistry,
    started_at: Instant,
}

impl CoreState {
    /// Wire up the production clients and stores.
    pub fn from_config(config: AppConfig) -> Result<Self, CoreError> {
        let llm = GeminiClient::new(
            &config.llm_base_url,
            &config.llm_model,
            config.llm_api_key.clone(),
            config.llm_timeout_secs,
        )?;
        if config.llm_api_key.is_none() {
            tracing::warn!("RXCHECK_LLM_API_KEY is not set, analysis requests will fail");
        }

        let rxnav: Option<Arc<dyn RemoteSuggestionSource>> =
            match RxNavSource::new(&config.rxnav_base_url, AUXILIARY_TIMEOUT_SECS) {
                Ok(source) => Some(Arc::new(source)),
                Err(e) => {
                    tracing::warn!(error = %e, "RxNav unavailable, suggestions are local only");
                    None
                }
            };

        let local = LocalHistoryStore::open(&config.db_path)?;
        let remote: Option<Arc<dyn HistoryStore>> = match &config.remote_store_url {
            Some(url) => Some(Arc::new(RemoteHistoryStore::new(url, AUXILIARY_TIMEOUT_SECS)?)),
            None => None,
        };

        tracing::info!(
            db_path = %config.db_path.display(),
            model = %config.llm_model,
            remote_store = remote.is_some(),
            "Core state initialized"
        );

        Ok(Self::with_parts(
            config,
            Arc::new(llm),
            SuggestionEngine::new(rxnav, SuggestionConfig::default()),
            Arc::new(local),
            remote,
        ))
    }

    /// Assemble from already-built parts.
    pub fn with_parts(
        config: AppConfig,
        llm: Arc<dyn LlmClient>,
        suggestions: SuggestionEngine,
        local: Arc<dyn HistoryStore>,
        remote: Option<Arc<dyn HistoryStore>>,
    ) -> Self {
        Self {
            config,
            analyzer: InteractionAnalyzer::new(llm),
            matcher: ProactiveAlertMatcher::new(),
            suggestions,
            history: Arc::new(PersistenceAdapter::new(local, remote)),
            batches: BatchRegistry::new(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Runner for a batch submitted by `user`; results are saved under that
    /// user when the job asks for it.
    pub fn batch_runner(&self, user: UserContext) -> BatchRunner {
        BatchRunner::new(self.analyzer.clone()).with_history(HistorySink {
            store: self.history.clone(),
            user,
        })
    }
}

#[cfg(test)]
impl CoreState {
    /// In-memory state around a scripted model, for handler tests.
    pub(crate) fn for_tests(llm: Arc<dyn LlmClient>) -> Self {
        let local = LocalHistoryStore::open_in_memory().expect("in-memory store");
        Self::with_parts(
            AppConfig::default(),
            llm,
            SuggestionEngine::local_only(),
            Arc::new(local),
            None,
        )
    }
}
