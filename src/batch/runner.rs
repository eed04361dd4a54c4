use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;

use crate::alerts::ProactiveAlertMatcher;
use crate::analysis::InteractionAnalyzer;
use crate::models::{AnalysisOptions, AnalysisRequest, HistoryEntry, PatientRecord};
use crate::storage::{HistoryStore, UserContext};

use super::tracker::BatchTracker;
use super::types::{effective_concurrency, BatchEvent, BatchOptions, BatchSummary};

/// Where completed results are saved, when the job asks for it.
#[derive(Clone)]
pub struct HistorySink {
    pub store: Arc<dyn HistoryStore>,
    pub user: UserContext,
}

/// Runs a batch with a bounded number of concurrent workers.
///
/// Workers pull record indices from a shared queue, so each record is
/// analyzed at most once. The run returns only when every record is
/// terminal.
#[derive(Clone)]
pub struct BatchRunner {
    analyzer: InteractionAnalyzer,
    matcher: ProactiveAlertMatcher,
    history: Option<HistorySink>,
    events: Option<UnboundedSender<BatchEvent>>,
}

impl BatchRunner {
    pub fn new(analyzer: InteractionAnalyzer) -> Self {
        Self {
            analyzer,
            matcher: ProactiveAlertMatcher::new(),
            history: None,
            events: None,
        }
    }

    pub fn with_history(mut self, sink: HistorySink) -> Self {
        self.history = Some(sink);
        self
    }

    pub fn with_events(mut self, events: UnboundedSender<BatchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// A closed receiver only means nobody is listening.
    fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    pub async fn run(&self, tracker: &BatchTracker, options: &BatchOptions) -> BatchSummary {
        let start = Instant::now();
        let total = tracker.len();
        let workers = if total == 0 {
            0
        } else {
            effective_concurrency(options.concurrency, total)
        };
        // Saving is opt-in per job.
        let history = self.history.clone().filter(|_| options.save_to_history);

        tracing::info!(
            job_id = %tracker.job_id(),
            total,
            workers,
            save_to_history = history.is_some(),
            "Batch started"
        );

        let queue = Arc::new(Mutex::new((0..total).collect::<VecDeque<usize>>()));
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let worker = Worker {
                runner: self.clone(),
                history: history.clone(),
                tracker: tracker.clone(),
                queue: queue.clone(),
                options: options.analysis.clone(),
            };
            handles.push(tokio::spawn(async move { worker.drain(worker_id).await }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Batch worker aborted");
            }
        }

        let abandoned = tracker.abandon_unfinished("worker aborted before finishing");
        if abandoned > 0 {
            tracing::warn!(abandoned, "Batch items left unfinished by a worker");
        }
        tracker.mark_finished();

        let summary = tracker.summary(start.elapsed().as_millis() as u64);
        tracing::info!(
            job_id = %tracker.job_id(),
            completed = summary.completed,
            failed = summary.failed,
            high_risk = summary.high_risk,
            duration_ms = summary.duration_ms,
            "Batch finished"
        );
        self.emit(BatchEvent::Finished {
            summary: summary.clone(),
        });
        summary
    }
}

struct Worker {
    runner: BatchRunner,
    history: Option<HistorySink>,
    tracker: BatchTracker,
    queue: Arc<Mutex<VecDeque<usize>>>,
    options: AnalysisOptions,
}

impl Worker {
    fn next_index(&self) -> Option<usize> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    async fn drain(self, worker_id: usize) {
        while let Some(index) = self.next_index() {
            let Some(record) = self.tracker.record(index) else {
                continue;
            };
            if let Err(e) = self.tracker.start(index) {
                tracing::warn!(worker_id, error = %e, "Skipping batch item");
                continue;
            }
            self.runner.emit(BatchEvent::ItemStarted {
                index,
                record_id: record.id.clone(),
            });
            self.process(index, record).await;
        }
        tracing::debug!(worker_id, "Batch worker idle, queue drained");
    }

    async fn process(&self, index: usize, record: PatientRecord) {
        let request = AnalysisRequest {
            profile: record.profile.clone(),
            options: self.options.clone(),
        };

        match self.runner.analyzer.analyze(&request).await {
            Ok(result) => {
                let alerts = self
                    .runner
                    .matcher
                    .scan_categories(&request.profile, &request.options.effective_categories());
                let overall_risk = result.overall_risk;
                let history_id = match &self.history {
                    Some(sink) => {
                        let entry = HistoryEntry::new(
                            &sink.user.user_id,
                            &record.label,
                            request,
                            result.clone(),
                            alerts.clone(),
                        );
                        match sink.store.save(&sink.user, &entry).await {
                            Ok(()) => Some(entry.id),
                            Err(e) => {
                                tracing::warn!(
                                    record_id = %record.id,
                                    error = %e,
                                    "Could not save batch result to history"
                                );
                                None
                            }
                        }
                    }
                    None => None,
                };
                if let Err(e) = self.tracker.complete(index, result, alerts, history_id) {
                    tracing::warn!(error = %e, "Batch item state changed underneath worker");
                    return;
                }
                self.runner.emit(BatchEvent::ItemCompleted {
                    index,
                    record_id: record.id,
                    overall_risk,
                });
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(record_id = %record.id, error = %message, "Batch item failed");
                if let Err(e) = self.tracker.fail(index, &message) {
                    tracing::warn!(error = %e, "Batch item state changed underneath worker");
                    return;
                }
                self.runner.emit(BatchEvent::ItemFailed {
                    index,
                    record_id: record.id,
                    error: message,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisError, MockLlmClient};
    use crate::batch::types::ItemStatus;
    use crate::models::{PatientProfile, RiskLevel};
    use crate::storage::LocalHistoryStore;
    use std::time::Duration;
    use tokio::sync::mpsc;

    const HIGH: &str = r#"{"summary":"s","overall_risk":"high","interactions":[]}"#;
    const LOW: &str = r#"{"summary":"s","overall_risk":"low","interactions":[]}"#;

    fn records(meds: &[&str]) -> Vec<PatientRecord> {
        meds.iter()
            .enumerate()
            .map(|(i, m)| PatientRecord {
                id: format!("p{i}"),
                label: format!("Patient {i}"),
                profile: PatientProfile {
                    medications: if m.is_empty() { vec![] } else { vec![m.to_string()] },
                    ..Default::default()
                },
            })
            .collect()
    }

    /// Fails on prompts mentioning "boom", answers high risk for warfarin.
    fn scripted() -> MockLlmClient {
        MockLlmClient::with_responder(|prompt| {
            if prompt.contains("boom") {
                Err(AnalysisError::Api {
                    status: 503,
                    body: "overloaded".into(),
                })
            } else if prompt.contains("Warfarin") {
                Ok(HIGH.to_string())
            } else {
                Ok(LOW.to_string())
            }
        })
    }

    fn options(concurrency: usize) -> BatchOptions {
        BatchOptions {
            concurrency,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn every_record_reaches_a_terminal_state() {
        let mock = Arc::new(scripted());
        let runner = BatchRunner::new(InteractionAnalyzer::new(mock.clone()));
        let tracker = BatchTracker::new("job", records(&["Warfarin", "boom", "Metformin", ""]));

        let summary = runner.run(&tracker, &options(2)).await;
        assert_eq!(summary.total, 4);
        assert_eq!(summary.completed, 2);
        // the upstream failure and the empty profile
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.high_risk, 1);

        let snap = tracker.snapshot();
        assert!(snap.finished);
        assert!(snap.items.iter().all(|i| i.status.is_terminal()));
        assert_eq!(snap.items[0].status, ItemStatus::Completed);
        assert_eq!(snap.items[1].status, ItemStatus::Error);
        assert!(snap.items[1].error.as_deref().unwrap().contains("503"));
        // invalid requests never reach the model
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let mock = Arc::new(scripted().with_delay(Duration::from_millis(20)));
        let runner = BatchRunner::new(InteractionAnalyzer::new(mock.clone()));
        let meds = ["Metformin"; 8];
        let tracker = BatchTracker::new("job", records(&meds));

        let summary = runner.run(&tracker, &options(3)).await;
        assert_eq!(summary.completed, 8);
        assert_eq!(mock.call_count(), 8);
        assert!(mock.peak_concurrency() <= 3);
        assert!(mock.peak_concurrency() >= 2);
    }

    #[tokio::test]
    async fn zero_concurrency_still_runs() {
        let mock = Arc::new(scripted());
        let runner = BatchRunner::new(InteractionAnalyzer::new(mock.clone()));
        let tracker = BatchTracker::new("job", records(&["Metformin", "Lisinopril"]));
        let summary = runner.run(&tracker, &options(0)).await;
        assert_eq!(summary.completed, 2);
        assert_eq!(mock.peak_concurrency(), 1);
    }

    #[tokio::test]
    async fn empty_batch_finishes_immediately() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner =
            BatchRunner::new(InteractionAnalyzer::new(Arc::new(scripted()))).with_events(tx);
        let tracker = BatchTracker::new("job", vec![]);
        let summary = runner.run(&tracker, &options(3)).await;
        assert_eq!(summary.total, 0);
        assert!(tracker.is_finished());
        assert!(matches!(rx.recv().await, Some(BatchEvent::Finished { .. })));
    }

    #[tokio::test]
    async fn emits_progress_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner =
            BatchRunner::new(InteractionAnalyzer::new(Arc::new(scripted()))).with_events(tx);
        let tracker = BatchTracker::new("job", records(&["Warfarin", "boom"]));
        runner.run(&tracker, &options(1)).await;
        drop(runner);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        let started = events
            .iter()
            .filter(|e| matches!(e, BatchEvent::ItemStarted { .. }))
            .count();
        assert_eq!(started, 2);
        assert!(events.contains(&BatchEvent::ItemCompleted {
            index: 0,
            record_id: "p0".into(),
            overall_risk: RiskLevel::High,
        }));
        assert!(events
            .iter()
            .any(|e| matches!(e, BatchEvent::ItemFailed { index: 1, .. })));
        assert!(matches!(events.last(), Some(BatchEvent::Finished { .. })));
    }

    #[tokio::test]
    async fn saves_completed_results_when_requested() {
        let store = Arc::new(LocalHistoryStore::open_in_memory().unwrap());
        let user = UserContext::demo();
        let runner = BatchRunner::new(InteractionAnalyzer::new(Arc::new(scripted()))).with_history(
            HistorySink {
                store: store.clone(),
                user: user.clone(),
            },
        );

        let tracker = BatchTracker::new("job", records(&["Warfarin", "boom"]));
        runner.run(&tracker, &options(2)).await;
        assert!(store.list(&user, None).await.unwrap().is_empty());

        let tracker = BatchTracker::new("job2", records(&["Warfarin", "boom"]));
        let opts = BatchOptions {
            save_to_history: true,
            ..options(2)
        };
        runner.run(&tracker, &opts).await;
        let saved = store.list(&user, None).await.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].patient_label, "Patient 0");
        assert_eq!(
            tracker.snapshot().items[0].history_id.as_deref(),
            Some(saved[0].id.as_str())
        );
    }
}
