//! Proactive alert endpoint.
//!
//! `POST /api/alerts`: rule-based alerts for a profile, no model call.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::alerts::{AlertSeverity, ProactiveAlert};
use crate::api::types::ApiContext;
use crate::models::{InteractionCategory, PatientProfile};

#[derive(Debug, Deserialize)]
pub struct AlertsBody {
    pub profile: PatientProfile,
    /// Empty means every category.
    #[serde(default)]
    pub categories: Vec<InteractionCategory>,
}

#[derive(Serialize)]
pub struct AlertsResponse {
    pub critical: usize,
    pub alerts: Vec<ProactiveAlert>,
}

pub async fn scan(State(ctx): State<ApiContext>, Json(body): Json<AlertsBody>) -> Json<AlertsResponse> {
    let profile = body.profile.normalized();
    let alerts = if body.categories.is_empty() {
        ctx.core.matcher.scan(&profile)
    } else {
        ctx.core.matcher.scan_categories(&profile, &body.categories)
    };
    let critical = alerts
        .iter()
        .filter(|a| a.severity == AlertSeverity::Critical)
        .count();

    Json(AlertsResponse { critical, alerts })
}
