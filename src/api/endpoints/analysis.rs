//! Analysis endpoints.
//!
//! `POST /api/analyze` runs the full check: model analysis, local alerts,
//! rendered report and (unless `save` is false) a history entry.
//! `POST /api/render` re-renders a result the client already holds.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{AnalyzeBody, AnalyzeResponse, ApiContext};
use crate::models::{AnalysisResult, HistoryEntry};
use crate::render::{render_report, RenderedReport};
use crate::storage::{HistoryStore, UserContext};

pub async fn analyze(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<AnalyzeBody>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let request = body.request.validated().map_err(ApiError::BadRequest)?;

    let result = ctx.core.analyzer.analyze(&request).await?;
    let alerts = ctx
        .core
        .matcher
        .scan_categories(&request.profile, &request.options.effective_categories());
    let report = render_report(&result);

    let history_id = if body.save {
        let entry = HistoryEntry::new(
            &user.user_id,
            &body.patient_label,
            request,
            result.clone(),
            alerts.clone(),
        );
        // The result is still returned when history is unavailable.
        match ctx.core.history.save(&user, &entry).await {
            Ok(()) => Some(entry.id),
            Err(e) => {
                tracing::warn!(user_id = %user.user_id, error = %e, "Analysis not saved to history");
                None
            }
        }
    } else {
        None
    };

    Ok(Json(AnalyzeResponse {
        history_id,
        result,
        alerts,
        report,
    }))
}

pub async fn render(Json(result): Json<AnalysisResult>) -> Json<RenderedReport> {
    Json(render_report(&result))
}
