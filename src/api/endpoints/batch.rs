//! Batch job endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, BatchAccepted, BatchBody};
use crate::batch::BatchSnapshot;
use crate::storage::UserContext;

/// `POST /api/batch`: start a job; poll `GET /api/batch/:id` for progress.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<BatchBody>,
) -> Result<(StatusCode, Json<BatchAccepted>), ApiError> {
    if body.records.is_empty() {
        return Err(ApiError::BadRequest("Batch has no patient records".into()));
    }
    let options = body
        .options
        .into_batch_options(ctx.core.config.batch_concurrency);

    let total = body.records.len();
    let runner = ctx.core.batch_runner(user.clone());
    let job_id = ctx.core.batches.submit(runner, body.records, options);
    tracing::info!(%job_id, user_id = %user.user_id, total, "Batch job submitted");

    Ok((StatusCode::ACCEPTED, Json(BatchAccepted { job_id, total })))
}

pub async fn status(
    State(ctx): State<ApiContext>,
    Path(job_id): Path<String>,
) -> Result<Json<BatchSnapshot>, ApiError> {
    ctx.core
        .batches
        .snapshot(&job_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Batch job {job_id}")))
}
