use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::interaction::AnalysisResult;
use super::patient::AnalysisRequest;
use crate::alerts::ProactiveAlert;

/// A saved analysis, the unit the persistence layer stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub patient_label: String,
    pub request: AnalysisRequest,
    pub result: AnalysisResult,
    #[serde(default)]
    pub alerts: Vec<ProactiveAlert>,
    /// SHA-256 of the normalized request, lets the front-end spot repeat checks.
    #[serde(default)]
    pub fingerprint: String,
}

impl HistoryEntry {
    pub fn new(
        user_id: &str,
        patient_label: &str,
        request: AnalysisRequest,
        result: AnalysisResult,
        alerts: Vec<ProactiveAlert>,
    ) -> Self {
        let fingerprint = request_fingerprint(&request);
        let label = patient_label.trim();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
            patient_label: if label.is_empty() {
                "Unnamed patient".to_string()
            } else {
                label.to_string()
            },
            request,
            result,
            alerts,
            fingerprint,
        }
    }
}

/// Hex SHA-256 over the lowercased, sorted profile lists.
pub fn request_fingerprint(request: &AnalysisRequest) -> String {
    let profile = request.profile.normalized();
    let mut hasher = Sha256::new();
    let sections: [(&str, &Vec<String>); 6] = [
        ("medications", &profile.medications),
        ("supplements", &profile.supplements),
        ("substances", &profile.substances),
        ("allergies", &profile.allergies),
        ("conditions", &profile.conditions),
        ("genetic_markers", &profile.genetic_markers),
    ];
    for (name, items) in sections {
        let mut lowered: Vec<String> = items.iter().map(|s| s.to_lowercase()).collect();
        lowered.sort();
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(lowered.join("|").as_bytes());
        hasher.update(b";");
    }
    hasher.update(format!("age={:?};", profile.age).as_bytes());
    for c in request.options.effective_categories() {
        hasher.update(c.as_str().as_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
