//! Autocomplete endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::suggestions::{Suggestion, SuggestionKind};

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub q: String,
    pub kind: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct SuggestionsResponse {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
}

/// `GET /api/suggestions?q=&kind=&limit=`
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(params): Query<SuggestionQuery>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let kind = match params.kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<SuggestionKind>().map_err(ApiError::BadRequest)?),
    };

    let suggestions = ctx.core.suggestions.suggest(&params.q, kind, params.limit).await;
    Ok(Json(SuggestionsResponse {
        query: params.q,
        suggestions,
    }))
}
