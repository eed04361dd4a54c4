//! History persistence.
//!
//! Two backends sit behind [`HistoryStore`]: the local SQLite store and the
//! hosted document database. [`PersistenceAdapter`] picks one per call from
//! the caller's identity.

pub mod local;
pub mod remote;

use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;

use crate::config::DEMO_USER_ID;
use crate::db::DatabaseError;
use crate::models::HistoryEntry;

pub use local::LocalHistoryStore;
pub use remote::RemoteHistoryStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("History entry not found: {0}")]
    NotFound(String),

    #[error("Remote store unreachable: {0}")]
    Http(String),

    #[error("Remote store returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid remote store URL: {0}")]
    InvalidUrl(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(e))
    }
}

/// Who is asking. The id comes from the identity provider; the bearer token
/// is passed through untouched to the hosted store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub bearer_token: Option<String>,
}

impl UserContext {
    pub fn new(user_id: &str, bearer_token: Option<String>) -> Self {
        let trimmed = user_id.trim();
        Self {
            user_id: if trimmed.is_empty() {
                DEMO_USER_ID.to_string()
            } else {
                trimmed.to_string()
            },
            bearer_token,
        }
    }

    pub fn demo() -> Self {
        Self::new(DEMO_USER_ID, None)
    }

    pub fn is_demo(&self) -> bool {
        self.user_id == DEMO_USER_ID
    }
}

/// Storage for saved analyses. Listing is newest first.
pub trait HistoryStore: Send + Sync {
    /// Insert or replace (last write wins).
    fn save<'a>(
        &'a self,
        ctx: &'a UserContext,
        entry: &'a HistoryEntry,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    fn list<'a>(
        &'a self,
        ctx: &'a UserContext,
        limit: Option<usize>,
    ) -> BoxFuture<'a, Result<Vec<HistoryEntry>, StorageError>>;

    fn get<'a>(
        &'a self,
        ctx: &'a UserContext,
        id: &'a str,
    ) -> BoxFuture<'a, Result<HistoryEntry, StorageError>>;

    fn delete<'a>(
        &'a self,
        ctx: &'a UserContext,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Remove every entry of the user, returning how many were removed.
    fn clear<'a>(&'a self, ctx: &'a UserContext) -> BoxFuture<'a, Result<usize, StorageError>>;

    fn backend_name(&self) -> &'static str;
}

/// Newest first; ties broken by id so the order is stable.
pub(crate) fn sort_newest_first(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}

// ═══════════════════════════════════════════════════════════
// PersistenceAdapter
// ═══════════════════════════════════════════════════════════

/// Routes history calls: the demo user (or everyone, when no remote store is
/// configured) goes to the local store, other users to the remote store.
///
/// A failed remote save is retried on the local store so the analysis is
/// never lost; reads for remote users therefore also consult the local
/// store for such fallback entries.
pub struct PersistenceAdapter {
    local: Arc<dyn HistoryStore>,
    remote: Option<Arc<dyn HistoryStore>>,
}

impl PersistenceAdapter {
    pub fn new(local: Arc<dyn HistoryStore>, remote: Option<Arc<dyn HistoryStore>>) -> Self {
        Self { local, remote }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Remote store for this caller, `None` when the local store applies.
    fn remote_for(&self, ctx: &UserContext) -> Option<&Arc<dyn HistoryStore>> {
        if ctx.is_demo() {
            None
        } else {
            self.remote.as_ref()
        }
    }

    /// Name of the backend that serves this caller.
    pub fn backend_for(&self, ctx: &UserContext) -> &'static str {
        match self.remote_for(ctx) {
            Some(remote) => remote.backend_name(),
            None => self.local.backend_name(),
        }
    }
}

impl HistoryStore for PersistenceAdapter {
    fn save<'a>(
        &'a self,
        ctx: &'a UserContext,
        entry: &'a HistoryEntry,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            let Some(remote) = self.remote_for(ctx) else {
                return self.local.save(ctx, entry).await;
            };
            match remote.save(ctx, entry).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    tracing::warn!(
                        user_id = %ctx.user_id,
                        entry_id = %entry.id,
                        error = %e,
                        "Remote history save failed, keeping entry in local store"
                    );
                    self.local.save(ctx, entry).await
                }
            }
        }
        .boxed()
    }

    fn list<'a>(
        &'a self,
        ctx: &'a UserContext,
        limit: Option<usize>,
    ) -> BoxFuture<'a, Result<Vec<HistoryEntry>, StorageError>> {
        async move {
            let Some(remote) = self.remote_for(ctx) else {
                return self.local.list(ctx, limit).await;
            };
            let mut entries = remote.list(ctx, limit).await.unwrap_or_else(|e| {
                tracing::warn!(
                    user_id = %ctx.user_id,
                    error = %e,
                    "Remote history list failed, showing local entries only"
                );
                Vec::new()
            });
            let fallbacks = self.local.list(ctx, limit).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Could not read local fallback entries");
                Vec::new()
            });
            for entry in fallbacks {
                if !entries.iter().any(|e| e.id == entry.id) {
                    entries.push(entry);
                }
            }
            sort_newest_first(&mut entries);
            if let Some(limit) = limit {
                entries.truncate(limit);
            }
            Ok(entries)
        }
        .boxed()
    }

    fn get<'a>(
        &'a self,
        ctx: &'a UserContext,
        id: &'a str,
    ) -> BoxFuture<'a, Result<HistoryEntry, StorageError>> {
        async move {
            let Some(remote) = self.remote_for(ctx) else {
                return self.local.get(ctx, id).await;
            };
            match remote.get(ctx, id).await {
                Err(StorageError::NotFound(_)) => self.local.get(ctx, id).await,
                other => other,
            }
        }
        .boxed()
    }

    fn delete<'a>(
        &'a self,
        ctx: &'a UserContext,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            let Some(remote) = self.remote_for(ctx) else {
                return self.local.delete(ctx, id).await;
            };
            match remote.delete(ctx, id).await {
                Err(StorageError::NotFound(_)) => self.local.delete(ctx, id).await,
                other => other,
            }
        }
        .boxed()
    }

    fn clear<'a>(&'a self, ctx: &'a UserContext) -> BoxFuture<'a, Result<usize, StorageError>> {
        async move {
            let Some(remote) = self.remote_for(ctx) else {
                return self.local.clear(ctx).await;
            };
            let removed = remote.clear(ctx).await?;
            let local_removed = self.local.clear(ctx).await?;
            Ok(removed + local_removed)
        }
        .boxed()
    }

    fn backend_name(&self) -> &'static str {
        "adapter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interaction::fixtures::sample_result;
    use crate::models::{AnalysisRequest, PatientProfile};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Remote stand-in that fails every call.
    struct DownStore {
        calls: AtomicUsize,
    }

    impl HistoryStore for DownStore {
        fn save<'a>(
            &'a self,
            _ctx: &'a UserContext,
            _entry: &'a HistoryEntry,
        ) -> BoxFuture<'a, Result<(), StorageError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::Http("connection refused".into())) }.boxed()
        }

        fn list<'a>(
            &'a self,
            _ctx: &'a UserContext,
            _limit: Option<usize>,
        ) -> BoxFuture<'a, Result<Vec<HistoryEntry>, StorageError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async { Err(StorageError::Http("connection refused".into())) }.boxed()
        }

        fn get<'a>(
            &'a self,
            _ctx: &'a UserContext,
            id: &'a str,
        ) -> BoxFuture<'a, Result<HistoryEntry, StorageError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(StorageError::NotFound(id.to_string())) }.boxed()
        }

        fn delete<'a>(
            &'a self,
            _ctx: &'a UserContext,
            id: &'a str,
        ) -> BoxFuture<'a, Result<(), StorageError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(StorageError::NotFound(id.to_string())) }.boxed()
        }

        fn clear<'a>(&'a self, _ctx: &'a UserContext) -> BoxFuture<'a, Result<usize, StorageError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(0) }.boxed()
        }

        fn backend_name(&self) -> &'static str {
            "down"
        }
    }

    fn entry(user: &str, label: &str) -> HistoryEntry {
        HistoryEntry::new(
            user,
            label,
            AnalysisRequest {
                profile: PatientProfile {
                    medications: vec!["Warfarin".into()],
                    ..Default::default()
                },
                ..Default::default()
            },
            sample_result(),
            vec![],
        )
    }

    fn adapter_with_down_remote() -> (PersistenceAdapter, Arc<DownStore>) {
        let local = Arc::new(LocalHistoryStore::open_in_memory().unwrap());
        let remote = Arc::new(DownStore {
            calls: AtomicUsize::new(0),
        });
        (
            PersistenceAdapter::new(local, Some(remote.clone() as Arc<dyn HistoryStore>)),
            remote,
        )
    }

    #[test]
    fn blank_user_id_is_demo() {
        assert!(UserContext::new("  ", None).is_demo());
        assert!(!UserContext::new("alice", None).is_demo());
    }

    #[tokio::test]
    async fn demo_user_never_touches_remote() {
        let (adapter, remote) = adapter_with_down_remote();
        let ctx = UserContext::demo();
        let e = entry(&ctx.user_id, "Demo");
        adapter.save(&ctx, &e).await.unwrap();
        assert_eq!(adapter.list(&ctx, None).await.unwrap().len(), 1);
        assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
        assert_eq!(adapter.backend_for(&ctx), "sqlite");
    }

    #[tokio::test]
    async fn remote_save_failure_falls_back_to_local() {
        let (adapter, remote) = adapter_with_down_remote();
        let ctx = UserContext::new("alice", Some("Bearer t".into()));
        let e = entry("alice", "Patient A");
        adapter.save(&ctx, &e).await.unwrap();
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        assert_eq!(adapter.backend_for(&ctx), "down");

        // Fallback entries stay visible to the remote user.
        let listed = adapter.list(&ctx, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(adapter.get(&ctx, &e.id).await.unwrap().id, e.id);
        adapter.delete(&ctx, &e.id).await.unwrap();
        assert!(matches!(
            adapter.get(&ctx, &e.id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn remote_list_failure_still_shows_local_entries() {
        let (adapter, remote) = adapter_with_down_remote();
        let ctx = UserContext::new("alice", Some("Bearer t".into()));
        let older = entry("alice", "Older");
        let newer = entry("alice", "Newer");
        adapter.local.save(&ctx, &older).await.unwrap();
        adapter.local.save(&ctx, &newer).await.unwrap();

        let listed = adapter.list(&ctx, Some(1)).await.unwrap();
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn without_remote_everyone_is_local() {
        let local = Arc::new(LocalHistoryStore::open_in_memory().unwrap());
        let adapter = PersistenceAdapter::new(local, None);
        let ctx = UserContext::new("bob", None);
        adapter.save(&ctx, &entry("bob", "B")).await.unwrap();
        assert_eq!(adapter.list(&ctx, Some(10)).await.unwrap().len(), 1);
        assert!(!adapter.has_remote());
    }
}
