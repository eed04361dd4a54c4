use serde::{Deserialize, Serialize};

use super::enums::{InteractionCategory, RiskLevel};

/// Shown under every report; the model output is advisory only.
pub const DEFAULT_DISCLAIMER: &str = "This report is generated by an AI model for informational \
purposes and does not replace the judgement of a pharmacist or physician.";

/// One interaction reported by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub category: InteractionCategory,
    /// Drugs, substances, allergens, conditions or genes involved.
    pub involved: Vec<String>,
    pub risk: RiskLevel,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub management: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

/// Parsed analysis returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub overall_risk: RiskLevel,
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// Free-form markdown-like explanation.
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub disclaimer: String,
    #[serde(default)]
    pub model: String,
}

impl AnalysisResult {
    pub fn in_category(&self, category: InteractionCategory) -> Vec<&Interaction> {
        self.interactions
            .iter()
            .filter(|i| i.category == category)
            .collect()
    }

    pub fn count_in(&self, category: InteractionCategory) -> usize {
        self.interactions
            .iter()
            .filter(|i| i.category == category)
            .count()
    }

    pub fn high_risk_count(&self) -> usize {
        self.interactions
            .iter()
            .filter(|i| i.risk == RiskLevel::High)
            .count()
    }

    /// Worst risk across all interactions (`None` when there are none).
    pub fn worst_interaction_risk(&self) -> RiskLevel {
        RiskLevel::worst(self.interactions.iter().map(|i| i.risk))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn category_counts() {
        let result = sample_result();
        assert_eq!(result.count_in(InteractionCategory::DrugDrug), 1);
        assert_eq!(result.count_in(InteractionCategory::Beers), 0);
        assert_eq!(result.in_category(InteractionCategory::DrugSubstance).len(), 1);
    }

    #[test]
    fn high_risk_and_worst() {
        let result = sample_result();
        assert_eq!(result.high_risk_count(), 1);
        assert_eq!(result.worst_interaction_risk(), RiskLevel::High);
    }

    #[test]
    fn optional_fields_skipped_when_absent() {
        let i = interaction(InteractionCategory::Beers, RiskLevel::Low, "Diphenhydramine");
        let json = serde_json::to_value(&i).unwrap();
        assert!(json.get("mechanism").is_none());
        assert_eq!(json["management"], "Monitor closely");
        assert_eq!(json["category"], "beers");
    }
}
