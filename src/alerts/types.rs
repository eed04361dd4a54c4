use serde::{Deserialize, Serialize};

use crate::models::InteractionCategory;

/// Severity determines how loudly the front-end surfaces an alert.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Worth knowing, no action expected.
    Info,
    /// Needs review by the prescriber.
    Warning,
    /// Contraindicated or potentially life-threatening.
    Critical,
}

/// A rule hit raised by the local matcher, before any AI call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProactiveAlert {
    /// Stable per (rule, involved set): `{rule_id}:{involved...}`.
    pub id: String,
    pub rule_id: String,
    pub category: InteractionCategory,
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
    pub action: String,
    /// Profile entries that triggered the rule, as the user typed them.
    pub involved: Vec<String>,
}

impl ProactiveAlert {
    pub(crate) fn new(
        rule_id: &str,
        category: InteractionCategory,
        severity: AlertSeverity,
        title: &str,
        message: &str,
        action: &str,
        involved: Vec<String>,
    ) -> Self {
        Self {
            id: format!("{rule_id}:{}", involved_key(&involved)),
            rule_id: rule_id.to_string(),
            category,
            severity,
            title: title.to_string(),
            message: message.to_string(),
            action: action.to_string(),
            involved,
        }
    }
}

/// Order-insensitive, case-insensitive key of an involved set.
pub(crate) fn involved_key(involved: &[String]) -> String {
    let mut parts: Vec<String> = involved.iter().map(|s| s.trim().to_lowercase()).collect();
    parts.sort();
    parts.dedup();
    parts.join("+")
}
