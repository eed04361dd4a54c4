use std::path::Path;
use std::sync::Mutex;

use chrono::SecondsFormat;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{open_database, open_memory_database};
use crate::models::HistoryEntry;

use super::{HistoryStore, StorageError, UserContext};

/// History in the local SQLite database, one JSON document per row.
///
/// Rows are keyed by `(user_id, id)`; `created_at` is stored as fixed-width
/// RFC 3339 so text ordering is chronological.
pub struct LocalHistoryStore {
    conn: Mutex<Connection>,
}

impl LocalHistoryStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Ok(Self::new(open_database(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(open_memory_database()?))
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        f(&conn)
    }

    fn save_sync(&self, ctx: &UserContext, entry: &HistoryEntry) -> Result<(), StorageError> {
        let mut doc = entry.clone();
        doc.user_id = ctx.user_id.clone();
        let document = serde_json::to_string(&doc)?;
        let created_at = doc.created_at.to_rfc3339_opts(SecondsFormat::Micros, true);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO history_entries
                    (user_id, id, created_at, patient_label, overall_risk, fingerprint, document)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id, id) DO UPDATE SET
                    created_at = excluded.created_at,
                    patient_label = excluded.patient_label,
                    overall_risk = excluded.overall_risk,
                    fingerprint = excluded.fingerprint,
                    document = excluded.document",
                params![
                    doc.user_id,
                    doc.id,
                    created_at,
                    doc.patient_label,
                    doc.result.overall_risk.as_str(),
                    doc.fingerprint,
                    document,
                ],
            )?;
            Ok(())
        })
    }

    fn list_sync(
        &self,
        ctx: &UserContext,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryEntry>, StorageError> {
        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map_or(-1, |l| l as i64);
        let documents = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT document FROM history_entries
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![ctx.user_id, limit], |row| row.get::<_, String>(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })?;

        let mut entries = Vec::with_capacity(documents.len());
        for doc in documents {
            match serde_json::from_str::<HistoryEntry>(&doc) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(user_id = %ctx.user_id, error = %e, "Skipping unreadable history row");
                }
            }
        }
        Ok(entries)
    }

    fn get_sync(&self, ctx: &UserContext, id: &str) -> Result<HistoryEntry, StorageError> {
        let document = self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT document FROM history_entries WHERE user_id = ?1 AND id = ?2",
                    params![ctx.user_id, id],
                    |row| row.get::<_, String>(0),
                )
                .optional()?)
        })?;
        let document = document.ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(serde_json::from_str(&document)?)
    }

    fn delete_sync(&self, ctx: &UserContext, id: &str) -> Result<(), StorageError> {
        let removed = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM history_entries WHERE user_id = ?1 AND id = ?2",
                params![ctx.user_id, id],
            )?)
        })?;
        if removed == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn clear_sync(&self, ctx: &UserContext) -> Result<usize, StorageError> {
        self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM history_entries WHERE user_id = ?1",
                params![ctx.user_id],
            )?)
        })
    }
}

impl HistoryStore for LocalHistoryStore {
    fn save<'a>(
        &'a self,
        ctx: &'a UserContext,
        entry: &'a HistoryEntry,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move { self.save_sync(ctx, entry) }.boxed()
    }

    fn list<'a>(
        &'a self,
        ctx: &'a UserContext,
        limit: Option<usize>,
    ) -> BoxFuture<'a, Result<Vec<HistoryEntry>, StorageError>> {
        async move { self.list_sync(ctx, limit) }.boxed()
    }

    fn get<'a>(
        &'a self,
        ctx: &'a UserContext,
        id: &'a str,
    ) -> BoxFuture<'a, Result<HistoryEntry, StorageError>> {
        async move { self.get_sync(ctx, id) }.boxed()
    }

    fn delete<'a>(
        &'a self,
        ctx: &'a UserContext,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move { self.delete_sync(ctx, id) }.boxed()
    }

    fn clear<'a>(&'a self, ctx: &'a UserContext) -> BoxFuture<'a, Result<usize, StorageError>> {
        async move { self.clear_sync(ctx) }.boxed()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
