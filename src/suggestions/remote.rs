use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Deserialize;

use super::SuggestionError;

/// Live source of drug names for autocomplete.
pub trait RemoteSuggestionSource: Send + Sync {
    /// Candidate drug names for `term`, at most `max_entries`.
    fn lookup<'a>(
        &'a self,
        term: &'a str,
        max_entries: usize,
    ) -> BoxFuture<'a, Result<Vec<String>, SuggestionError>>;

    fn source_name(&self) -> &str;
}

/// NLM RxNav approximate-term search.
pub struct RxNavSource {
    base_url: String,
    client: reqwest::Client,
}

impl RxNavSource {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SuggestionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SuggestionError::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[derive(Deserialize)]
struct ApproximateTermResponse {
    #[serde(rename = "approximateGroup", default)]
    approximate_group: Option<ApproximateGroup>,
}

#[derive(Deserialize)]
struct ApproximateGroup {
    #[serde(default)]
    candidate: Vec<ApproximateCandidate>,
}

#[derive(Deserialize)]
struct ApproximateCandidate {
    #[serde(default)]
    name: Option<String>,
}

/// Candidate names in rank order, blanks and case-insensitive repeats dropped.
fn candidate_names(body: ApproximateTermResponse, max_entries: usize) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let candidates = body
        .approximate_group
        .map(|g| g.candidate)
        .unwrap_or_default();
    for candidate in candidates {
        let Some(name) = candidate.name.map(|n| n.trim().to_string()) else {
            continue;
        };
        if name.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            continue;
        }
        names.push(name);
        if names.len() >= max_entries {
            break;
        }
    }
    names
}

impl RemoteSuggestionSource for RxNavSource {
    fn lookup<'a>(
        &'a self,
        term: &'a str,
        max_entries: usize,
    ) -> BoxFuture<'a, Result<Vec<String>, SuggestionError>> {
        async move {
            let url = format!("{}/REST/approximateTerm.json", self.base_url);
            let max = max_entries.to_string();
            let response = self
                .client
                .get(&url)
                .query(&[("term", term), ("maxEntries", max.as_str())])
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        SuggestionError::Http(format!("RxNav timed out: {e}"))
                    } else {
                        SuggestionError::Http(e.to_string())
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SuggestionError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed: ApproximateTermResponse = response
                .json()
                .await
                .map_err(|e| SuggestionError::Parse(e.to_string()))?;
            Ok(candidate_names(parsed, max_entries))
        }
        .boxed()
    }

    fn source_name(&self) -> &str {
        "rxnav"
    }
}

/// Scripted source for tests.
pub struct MockSuggestionSource {
    names: Vec<String>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockSuggestionSource {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|s| s.to_string()).collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            names: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RemoteSuggestionSource for MockSuggestionSource {
    fn lookup<'a>(
        &'a self,
        _term: &'a str,
        max_entries: usize,
    ) -> BoxFuture<'a, Result<Vec<String>, SuggestionError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SuggestionError::Http("connection refused".into()));
            }
            Ok(self.names.iter().take(max_entries).cloned().collect())
        }
        .boxed()
    }

    fn source_name(&self) -> &str {
        "mock"
    }
}
