//! Autocomplete for the profile form.
//!
//! Merges the curated local catalog with live drug names from a remote
//! source. Local hits are scored slightly higher than remote ones so curated
//! spellings win ties. The remote source is best effort: failures are logged
//! and the local results are returned alone.

pub mod catalog;
pub mod remote;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog::{default_catalog, CatalogEntry};
pub use remote::{MockSuggestionSource, RemoteSuggestionSource, RxNavSource};

// ─── Public types ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Drug,
    Condition,
    Supplement,
    Substance,
    Allergy,
}

impl std::str::FromStr for SuggestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drug" | "medication" | "drugs" | "medications" => Ok(Self::Drug),
            "condition" | "conditions" => Ok(Self::Condition),
            "supplement" | "supplements" => Ok(Self::Supplement),
            "substance" | "substances" => Ok(Self::Substance),
            "allergy" | "allergies" => Ok(Self::Allergy),
            other => Err(format!("Unknown suggestion kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Local,
    Remote,
}

/// One ranked autocomplete entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub kind: SuggestionKind,
    pub source: SuggestionSource,
    pub score: u32,
    /// Set when the query matched a brand alias rather than the name itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_alias: Option<String>,
}

#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Remote source returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Could not parse remote response: {0}")]
    Parse(String),
}

#[derive(Debug, Clone)]
pub struct SuggestionConfig {
    pub max_results: usize,
    /// Shorter queries return nothing.
    pub min_query_len: usize,
    /// Shorter queries skip the remote source.
    pub min_remote_query_len: usize,
    pub remote_max_entries: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            min_query_len: 2,
            min_remote_query_len: 3,
            remote_max_entries: 20,
        }
    }
}

// ─── Scoring primitives ──────────────────────────────────────────────────────

pub const SCORE_EXACT: u32 = 100;
pub const SCORE_PREFIX: u32 = 80;
pub const SCORE_WORD_PREFIX: u32 = 60;
pub const SCORE_SUBSTRING: u32 = 40;
/// Bonus for curated entries.
pub const LOCAL_BONUS: u32 = 5;

/// Match quality of `query` against `candidate`, both already lowercased and
/// trimmed. `None` when the candidate does not match at all.
pub fn match_score(query: &str, candidate: &str) -> Option<u32> {
    if query.is_empty() {
        return None;
    }
    if candidate == query {
        Some(SCORE_EXACT)
    } else if candidate.starts_with(query) {
        Some(SCORE_PREFIX)
    } else if candidate
        .split(|c: char| c.is_whitespace() || c == '-' || c == '/')
        .any(|word| !word.is_empty() && word.starts_with(query))
    {
        Some(SCORE_WORD_PREFIX)
    } else if candidate.contains(query) {
        Some(SCORE_SUBSTRING)
    } else {
        None
    }
}

/// Best score of a catalog entry across its name and aliases.
fn score_entry(query: &str, entry: &CatalogEntry) -> Option<(u32, Option<String>)> {
    let by_name = match_score(query, &entry.name.to_lowercase()).map(|s| (s, None));
    let by_alias = entry
        .aliases
        .iter()
        .filter_map(|alias| match_score(query, alias).map(|s| (s, Some(alias.clone()))))
        .max_by_key(|(s, _)| *s);
    match (by_name, by_alias) {
        (Some(n), Some(a)) if a.0 > n.0 => Some(a),
        (Some(n), _) => Some(n),
        (None, a) => a,
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct SuggestionEngine {
    catalog: Vec<CatalogEntry>,
    remote: Option<Arc<dyn RemoteSuggestionSource>>,
    config: SuggestionConfig,
}

impl SuggestionEngine {
    pub fn new(remote: Option<Arc<dyn RemoteSuggestionSource>>, config: SuggestionConfig) -> Self {
        Self {
            catalog: default_catalog(),
            remote,
            config,
        }
    }

    /// Local catalog only.
    pub fn local_only() -> Self {
        Self::new(None, SuggestionConfig::default())
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Ranked suggestions for `query`, optionally restricted to one kind.
    /// `limit` defaults to `max_results`.
    pub async fn suggest(
        &self,
        query: &str,
        kind: Option<SuggestionKind>,
        limit: Option<usize>,
    ) -> Vec<Suggestion> {
        let q = query.trim().to_lowercase();
        if q.chars().count() < self.config.min_query_len {
            return Vec::new();
        }
        let limit = limit.unwrap_or(self.config.max_results);
        if limit == 0 {
            return Vec::new();
        }

        let mut candidates = self.local_candidates(&q, kind);
        let wants_drugs = kind.map_or(true, |k| k == SuggestionKind::Drug);
        if wants_drugs && q.chars().count() >= self.config.min_remote_query_len {
            candidates.extend(self.remote_candidates(&q).await);
        }

        dedup_by_name(&mut candidates);
        rank(&mut candidates);
        candidates.truncate(limit);
        candidates
    }

    fn local_candidates(&self, q: &str, kind: Option<SuggestionKind>) -> Vec<Suggestion> {
        self.catalog
            .iter()
            .filter(|e| kind.map_or(true, |k| k == e.kind))
            .filter_map(|e| {
                score_entry(q, e).map(|(score, matched_alias)| Suggestion {
                    name: e.name.clone(),
                    kind: e.kind,
                    source: SuggestionSource::Local,
                    score: score + LOCAL_BONUS,
                    matched_alias,
                })
            })
            .collect()
    }

    async fn remote_candidates(&self, q: &str) -> Vec<Suggestion> {
        let Some(remote) = &self.remote else {
            return Vec::new();
        };
        match remote.lookup(q, self.config.remote_max_entries).await {
            Ok(names) => names
                .into_iter()
                .filter_map(|name| {
                    match_score(q, &name.trim().to_lowercase()).map(|score| Suggestion {
                        name: name.trim().to_string(),
                        kind: SuggestionKind::Drug,
                        source: SuggestionSource::Remote,
                        score,
                        matched_alias: None,
                    })
                })
                .collect(),
            Err(e) => {
                tracing::warn!(
                    source = remote.source_name(),
                    error = %e,
                    "Remote suggestion lookup failed, using local results"
                );
                Vec::new()
            }
        }
    }
}

/// Keep one entry per case-insensitive name: highest score, local on ties.
fn dedup_by_name(candidates: &mut Vec<Suggestion>) {
    candidates.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| b.score.cmp(&a.score))
            .then_with(|| source_rank(a.source).cmp(&source_rank(b.source)))
    });
    candidates.dedup_by(|a, b| a.name.to_lowercase() == b.name.to_lowercase());
}

fn source_rank(source: SuggestionSource) -> u8 {
    match source {
        SuggestionSource::Local => 0,
        SuggestionSource::Remote => 1,
    }
}

/// Score desc, then shorter name, then alphabetical.
fn rank(candidates: &mut [Suggestion]) {
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.name.chars().count().cmp(&b.name.chars().count()))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(remote: MockSuggestionSource) -> (SuggestionEngine, Arc<MockSuggestionSource>) {
        let remote = Arc::new(remote);
        let engine = SuggestionEngine::new(
            Some(remote.clone() as Arc<dyn RemoteSuggestionSource>),
            SuggestionConfig::default(),
        );
        (engine, remote)
    }

    #[test]
    fn score_tiers() {
        assert_eq!(match_score("warfarin", "warfarin"), Some(SCORE_EXACT));
        assert_eq!(match_score("warf", "warfarin"), Some(SCORE_PREFIX));
        assert_eq!(match_score("mono", "isosorbide mononitrate"), Some(SCORE_WORD_PREFIX));
        assert_eq!(match_score("clav", "amoxicillin-clavulanate"), Some(SCORE_WORD_PREFIX));
        assert_eq!(match_score("farin", "warfarin"), Some(SCORE_SUBSTRING));
        assert_eq!(match_score("xyz", "warfarin"), None);
    }

    #[tokio::test]
    async fn short_query_returns_nothing() {
        let (engine, remote) = engine_with(MockSuggestionSource::with_names(&["Warfarin"]));
        assert!(engine.suggest("w", None, None).await.is_empty());
        assert!(engine.suggest("  ", None, None).await.is_empty());
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn two_char_query_is_local_only() {
        let (engine, remote) = engine_with(MockSuggestionSource::with_names(&["Warfarin"]));
        let results = engine.suggest("wa", None, None).await;
        assert!(results.iter().any(|s| s.name == "Warfarin"));
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn merges_and_prefers_local_copy() {
        let (engine, remote) = engine_with(MockSuggestionSource::with_names(&[
            "warfarin",
            "Warfarin Sodium",
        ]));
        let results = engine.suggest("warfarin", None, None).await;
        assert_eq!(remote.call_count(), 1);

        let warfarin: Vec<_> = results
            .iter()
            .filter(|s| s.name.eq_ignore_ascii_case("warfarin"))
            .collect();
        assert_eq!(warfarin.len(), 1);
        assert_eq!(warfarin[0].source, SuggestionSource::Local);
        assert_eq!(warfarin[0].score, SCORE_EXACT + LOCAL_BONUS);
        assert_eq!(results[0].name, "Warfarin");
        assert!(results.iter().any(|s| s.name == "Warfarin Sodium"
            && s.source == SuggestionSource::Remote));
    }

    #[tokio::test]
    async fn dedup_folds_non_ascii_case() {
        let (engine, _remote) = engine_with(MockSuggestionSource::with_names(&[
            "Ácido fólico",
            "ÁCIDO FÓLICO",
        ]));
        let results = engine.suggest("ácido", None, None).await;
        let folic: Vec<_> = results
            .iter()
            .filter(|s| s.name.to_lowercase() == "ácido fólico")
            .collect();
        assert_eq!(folic.len(), 1);
    }

    #[tokio::test]
    async fn remote_failure_falls_back_to_local() {
        let (engine, remote) = engine_with(MockSuggestionSource::failing());
        let results = engine.suggest("simva", None, None).await;
        assert_eq!(remote.call_count(), 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Simvastatin");
    }

    #[tokio::test]
    async fn brand_alias_reports_canonical_name() {
        let engine = SuggestionEngine::local_only();
        let results = engine.suggest("coumadin", None, None).await;
        assert_eq!(results[0].name, "Warfarin");
        assert_eq!(results[0].matched_alias.as_deref(), Some("coumadin"));
        assert_eq!(results[0].score, SCORE_EXACT + LOCAL_BONUS);
    }

    #[tokio::test]
    async fn kind_filter_skips_remote_for_non_drugs() {
        let (engine, remote) = engine_with(MockSuggestionSource::with_names(&["Asthmanefrin"]));
        let results = engine
            .suggest("asth", Some(SuggestionKind::Condition), None)
            .await;
        assert_eq!(remote.call_count(), 0);
        assert!(results.iter().all(|s| s.kind == SuggestionKind::Condition));
        assert_eq!(results[0].name, "Asthma");
    }

    #[tokio::test]
    async fn ranking_prefers_shorter_then_alphabetical() {
        let engine = SuggestionEngine::local_only();
        let results = engine.suggest("amox", Some(SuggestionKind::Drug), None).await;
        let names: Vec<&str> = results.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Amoxicillin", "Amoxicillin-Clavulanate"]);
    }

    #[tokio::test]
    async fn limit_truncates() {
        let engine = SuggestionEngine::local_only();
        let results = engine.suggest("in", None, Some(3)).await;
        assert_eq!(results.len(), 3);
        assert!(engine.suggest("in", None, Some(0)).await.is_empty());
    }

    #[test]
    fn kind_parses_plural_forms() {
        assert_eq!("Medications".parse::<SuggestionKind>(), Ok(SuggestionKind::Drug));
        assert!("bogus".parse::<SuggestionKind>().is_err());
    }
}
