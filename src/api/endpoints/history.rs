//! History endpoints: list, fetch, delete and export saved analyses.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::export::{self, export_filename, ExportFormat};
use crate::models::HistoryEntry;
use crate::storage::{HistoryStore, UserContext};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub backend: &'static str,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: usize,
}

/// `GET /api/history`: newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Query(query): Query<ListQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let entries = ctx.core.history.list(&user, query.limit).await?;
    Ok(Json(HistoryResponse {
        backend: ctx.core.history.backend_for(&user),
        entries,
    }))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<HistoryEntry>, ApiError> {
    Ok(Json(ctx.core.history.get(&user, &id).await?))
}

pub async fn remove(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    ctx.core.history.delete(&user, &id).await?;
    Ok(Json(DeleteResponse { deleted: 1 }))
}

/// `DELETE /api/history`: remove every entry of the caller.
pub async fn clear(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = ctx.core.history.clear(&user).await?;
    tracing::info!(user_id = %user.user_id, deleted, "History cleared");
    Ok(Json(DeleteResponse { deleted }))
}

// ─── Exports ─────────────────────────────────────────────────

fn attachment(bytes: Vec<u8>, format: ExportFormat, filename: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// `GET /api/history/export.csv`: one row per saved analysis.
pub async fn export_history_csv(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Response, ApiError> {
    let entries = ctx.core.history.list(&user, None).await?;
    let bytes = export::history_csv(&entries)?;
    let filename = export_filename("history", ExportFormat::Csv, Utc::now());
    Ok(attachment(bytes, ExportFormat::Csv, filename))
}

/// `GET /api/history/:id/export.csv`: one row per interaction.
pub async fn export_entry_csv(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let entry = ctx.core.history.get(&user, &id).await?;
    let bytes = export::result_csv(&entry)?;
    let filename = export_filename(&entry.patient_label, ExportFormat::Csv, Utc::now());
    Ok(attachment(bytes, ExportFormat::Csv, filename))
}

pub async fn export_entry_pdf(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let entry = ctx.core.history.get(&user, &id).await?;
    let bytes = export::result_pdf(&entry)?;
    let filename = export_filename(&entry.patient_label, ExportFormat::Pdf, Utc::now());
    Ok(attachment(bytes, ExportFormat::Pdf, filename))
}
