use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

use crate::models::HistoryEntry;

use super::{sort_newest_first, HistoryStore, StorageError, UserContext};

/// Hosted document database speaking a small REST contract:
///
/// | call   | method | path                               |
/// |--------|--------|------------------------------------|
/// | save   | PUT    | `/users/{user}/history/{id}`       |
/// | list   | GET    | `/users/{user}/history?limit=N`    |
/// | get    | GET    | `/users/{user}/history/{id}`       |
/// | delete | DELETE | `/users/{user}/history/{id}`       |
/// | clear  | DELETE | `/users/{user}/history`            |
///
/// The caller's bearer token is forwarded as-is.
pub struct RemoteHistoryStore {
    base_url: Url,
    client: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<HistoryEntry>),
    Wrapped { items: Vec<HistoryEntry> },
}

#[derive(Deserialize)]
struct ClearBody {
    #[serde(default)]
    deleted: usize,
}

impl RemoteHistoryStore {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StorageError> {
        let base_url =
            Url::parse(base_url.trim()).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::InvalidUrl(base_url.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StorageError::Http(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    /// `{base}/users/{user}/history[/{id}]`, segments percent-encoded.
    fn url(&self, ctx: &UserContext, id: Option<&str>) -> Result<Url, StorageError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StorageError::InvalidUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(["users", ctx.user_id.as_str(), "history"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, ctx: &UserContext) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &ctx.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, id: Option<&str>) -> Result<Response, StorageError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(StorageError::NotFound(id.to_string()));
            }
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Remote {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StorageError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl HistoryStore for RemoteHistoryStore {
    fn save<'a>(
        &'a self,
        ctx: &'a UserContext,
        entry: &'a HistoryEntry,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            let mut doc = entry.clone();
            doc.user_id = ctx.user_id.clone();
            let url = self.url(ctx, Some(&doc.id))?;
            let builder = self.request(Method::PUT, url, ctx).json(&doc);
            self.send(builder, None).await?;
            tracing::debug!(user_id = %ctx.user_id, entry_id = %doc.id, "Saved history entry remotely");
            Ok(())
        }
        .boxed()
    }

    fn list<'a>(
        &'a self,
        ctx: &'a UserContext,
        limit: Option<usize>,
    ) -> BoxFuture<'a, Result<Vec<HistoryEntry>, StorageError>> {
        async move {
            let url = self.url(ctx, None)?;
            let mut builder = self.request(Method::GET, url, ctx);
            if let Some(limit) = limit {
                builder = builder.query(&[("limit", limit)]);
            }
            let response = self.send(builder, None).await?;
            let mut entries = match Self::read_json::<ListBody>(response).await? {
                ListBody::Bare(items) | ListBody::Wrapped { items } => items,
            };
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
            let url = self.url(ctx, Some(id))?;
            let response = self.send(self.request(Method::GET, url, ctx), Some(id)).await?;
            Self::read_json(response).await
        }
        .boxed()
    }

    fn delete<'a>(
        &'a self,
        ctx: &'a UserContext,
        id: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        async move {
            let url = self.url(ctx, Some(id))?;
            self.send(self.request(Method::DELETE, url, ctx), Some(id)).await?;
            Ok(())
        }
        .boxed()
    }

    fn clear<'a>(&'a self, ctx: &'a UserContext) -> BoxFuture<'a, Result<usize, StorageError>> {
        async move {
            let url = self.url(ctx, None)?;
            let response = self.send(self.request(Method::DELETE, url, ctx), None).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| StorageError::Http(e.to_string()))?;
            // An empty body is a valid answer.
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(0);
            }
            Ok(serde_json::from_slice::<ClearBody>(&bytes)?.deleted)
        }
        .boxed()
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interaction::fixtures::sample_result;
    use crate::models::AnalysisRequest;
    use axum::extract::{Path, Query, State};
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Docs = Arc<Mutex<HashMap<(String, String), HistoryEntry>>>;

    #[derive(Clone, Default)]
    struct Fake {
        docs: Docs,
        seen_auth: Arc<Mutex<Vec<String>>>,
    }

    fn record_auth(fake: &Fake, headers: &HeaderMap) {
        if let Some(v) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
            fake.seen_auth.lock().unwrap().push(v.to_string());
        }
    }

    async fn put_doc(
        State(fake): State<Fake>,
        headers: HeaderMap,
        Path((user, id)): Path<(String, String)>,
        Json(doc): Json<HistoryEntry>,
    ) -> StatusCode {
        record_auth(&fake, &headers);
        fake.docs.lock().unwrap().insert((user, id), doc);
        StatusCode::NO_CONTENT
    }

    async fn get_doc(
        State(fake): State<Fake>,
        Path((user, id)): Path<(String, String)>,
    ) -> Result<Json<HistoryEntry>, StatusCode> {
        let found = fake.docs.lock().unwrap().get(&(user, id)).cloned();
        found.map(Json).ok_or(StatusCode::NOT_FOUND)
    }

    async fn delete_doc(
        State(fake): State<Fake>,
        Path((user, id)): Path<(String, String)>,
    ) -> StatusCode {
        let removed = fake.docs.lock().unwrap().remove(&(user, id));
        match removed {
            Some(_) => StatusCode::NO_CONTENT,
            None => StatusCode::NOT_FOUND,
        }
    }

    async fn list_docs(
        State(fake): State<Fake>,
        Path(user): Path<String>,
        Query(_q): Query<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        let items: Vec<HistoryEntry> = fake
            .docs
            .lock()
            .unwrap()
            .iter()
            .filter(|((u, _), _)| *u == user)
            .map(|(_, d)| d.clone())
            .collect();
        Json(serde_json::json!({ "items": items }))
    }

    async fn clear_docs(State(fake): State<Fake>, Path(user): Path<String>) -> Json<serde_json::Value> {
        let deleted = {
            let mut docs = fake.docs.lock().unwrap();
            let before = docs.len();
            docs.retain(|(u, _), _| *u != user);
            before - docs.len()
        };
        Json(serde_json::json!({ "deleted": deleted }))
    }

    async fn spawn_fake() -> (String, Fake) {
        let fake = Fake::default();
        let app = Router::new()
            .route("/api/users/:user/history", get(list_docs).delete(clear_docs))
            .route(
                "/api/users/:user/history/:id",
                get(get_doc).put(put_doc).delete(delete_doc),
            )
            .with_state(fake.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/api/"), fake)
    }

    fn entry(label: &str) -> HistoryEntry {
        HistoryEntry::new("ignored", label, AnalysisRequest::default(), sample_result(), vec![])
    }

    #[test]
    fn url_encodes_user_and_id() {
        let store = RemoteHistoryStore::new("https://db.example.test/v1/", 5).unwrap();
        let ctx = UserContext::new("a b/c", None);
        let url = store.url(&ctx, Some("e-1")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://db.example.test/v1/users/a%20b%2Fc/history/e-1"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            RemoteHistoryStore::new("not a url", 5),
            Err(StorageError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn round_trip_against_document_store() {
        let (base, fake) = spawn_fake().await;
        let store = RemoteHistoryStore::new(&base, 5).unwrap();
        let ctx = UserContext::new("alice", Some("tok-123".into()));

        let mut older = entry("Older");
        older.created_at = older.created_at - chrono::Duration::minutes(5);
        let newer = entry("Newer");
        store.save(&ctx, &older).await.unwrap();
        store.save(&ctx, &newer).await.unwrap();

        assert_eq!(
            fake.seen_auth.lock().unwrap().first().map(String::as_str),
            Some("Bearer tok-123")
        );

        let listed = store.list(&ctx, None).await.unwrap();
        let labels: Vec<&str> = listed.iter().map(|e| e.patient_label.as_str()).collect();
        assert_eq!(labels, vec!["Newer", "Older"]);
        assert_eq!(listed[0].user_id, "alice");
        assert_eq!(store.list(&ctx, Some(1)).await.unwrap().len(), 1);

        let fetched = store.get(&ctx, &newer.id).await.unwrap();
        assert_eq!(fetched.patient_label, "Newer");

        store.delete(&ctx, &newer.id).await.unwrap();
        assert!(matches!(store.get(&ctx, &newer.id).await, Err(StorageError::NotFound(_))));
        assert!(matches!(store.delete(&ctx, &newer.id).await, Err(StorageError::NotFound(_))));

        assert_eq!(store.clear(&ctx).await.unwrap(), 1);
        assert!(store.list(&ctx, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_store_is_http_error() {
        let store = RemoteHistoryStore::new("http://127.0.0.1:9/", 1).unwrap();
        let ctx = UserContext::new("alice", None);
        assert!(matches!(
            store.save(&ctx, &entry("x")).await,
            Err(StorageError::Http(_))
        ));
    }
}
