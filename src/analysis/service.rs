use std::sync::Arc;
use std::time::Instant;

use crate::models::{AnalysisRequest, AnalysisResult, DEFAULT_DISCLAIMER};

use super::client::LlmClient;
use super::parser::parse_response;
use super::prompt::{build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
use super::AnalysisError;

/// Validate → prompt → model → parse. Cheap to clone, shared across batch
/// workers.
#[derive(Clone)]
pub struct InteractionAnalyzer {
    client: Arc<dyn LlmClient>,
}

impl InteractionAnalyzer {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let request = request
            .validated()
            .map_err(AnalysisError::InvalidRequest)?;
        let prompt = build_analysis_prompt(&request);

        let start = Instant::now();
        let raw = self
            .client
            .generate(&prompt, ANALYSIS_SYSTEM_PROMPT)
            .await
            .inspect_err(|e| {
                tracing::warn!(model = self.client.model_name(), error = %e, "Analysis call failed");
            })?;
        let parsed = parse_response(&raw)?;
        let mut result = parsed.result;

        // Only categories the caller asked for.
        let wanted = request.options.effective_categories();
        result.interactions.retain(|i| wanted.contains(&i.category));
        if !parsed.overall_risk_given {
            result.overall_risk = result.worst_interaction_risk();
        }

        if result.disclaimer.is_empty() {
            result.disclaimer = DEFAULT_DISCLAIMER.to_string();
        }
        result.model = self.client.model_name().to_string();

        tracing::info!(
            model = %result.model,
            duration_ms = start.elapsed().as_millis() as u64,
            interactions = result.interactions.len(),
            overall_risk = result.overall_risk.as_str(),
            "Interaction analysis complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::client::MockLlmClient;
    use crate::models::{AnalysisOptions, InteractionCategory, PatientProfile, RiskLevel};

    const RESPONSE: &str = r#"{
        "summary": "s",
        "overall_risk": "moderate",
        "interactions": [
            {"category": "drug_drug", "involved": ["A", "B"], "risk": "moderate", "title": "A + B"},
            {"category": "beers", "involved": ["C"], "risk": "low", "title": "C"}
        ]
    }"#;

    fn request(meds: &[&str]) -> AnalysisRequest {
        AnalysisRequest {
            profile: PatientProfile {
                medications: meds.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
            options: AnalysisOptions::default(),
        }
    }

    #[tokio::test]
    async fn attaches_disclaimer_and_model() {
        let analyzer = InteractionAnalyzer::new(Arc::new(MockLlmClient::new(RESPONSE)));
        let result = analyzer.analyze(&request(&["A", "B"])).await.unwrap();
        assert_eq!(result.disclaimer, DEFAULT_DISCLAIMER);
        assert_eq!(result.model, "mock");
        assert_eq!(result.overall_risk, RiskLevel::Moderate);
        assert_eq!(result.interactions.len(), 2);
    }

    #[tokio::test]
    async fn invalid_request_never_calls_model() {
        let mock = Arc::new(MockLlmClient::new(RESPONSE));
        let analyzer = InteractionAnalyzer::new(mock.clone());
        let err = analyzer.analyze(&request(&[])).await.unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidRequest(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn drops_unrequested_categories() {
        let analyzer = InteractionAnalyzer::new(Arc::new(MockLlmClient::new(RESPONSE)));
        let mut req = request(&["A"]);
        req.options.categories = vec![InteractionCategory::DrugDrug];
        let result = analyzer.analyze(&req).await.unwrap();
        assert_eq!(result.interactions.len(), 1);
        assert_eq!(result.interactions[0].category, InteractionCategory::DrugDrug);
    }

    #[tokio::test]
    async fn derived_overall_risk_follows_requested_categories() {
        let reply = r#"{
            "summary": "s",
            "interactions": [
                {"category": "drug_drug", "involved": ["A", "B"], "risk": "low", "title": "A + B"},
                {"category": "beers", "involved": ["C"], "risk": "high", "title": "C"}
            ]
        }"#;
        let analyzer = InteractionAnalyzer::new(Arc::new(MockLlmClient::new(reply)));
        let mut req = request(&["A", "B"]);
        req.options.categories = vec![InteractionCategory::DrugDrug];
        let result = analyzer.analyze(&req).await.unwrap();
        assert_eq!(result.interactions.len(), 1);
        assert_eq!(result.overall_risk, RiskLevel::Low);
    }

    #[tokio::test]
    async fn model_overall_risk_is_kept_after_filtering() {
        let analyzer = InteractionAnalyzer::new(Arc::new(MockLlmClient::new(RESPONSE)));
        let mut req = request(&["A"]);
        req.options.categories = vec![InteractionCategory::Beers];
        let result = analyzer.analyze(&req).await.unwrap();
        assert_eq!(result.overall_risk, RiskLevel::Moderate);
    }

    #[tokio::test]
    async fn upstream_error_propagates() {
        let analyzer = InteractionAnalyzer::new(Arc::new(MockLlmClient::failing("503")));
        let err = analyzer.analyze(&request(&["A"])).await.unwrap_err();
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn malformed_output_is_reported() {
        let analyzer = InteractionAnalyzer::new(Arc::new(MockLlmClient::new("Sorry, no.")));
        let err = analyzer.analyze(&request(&["A"])).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }
}
