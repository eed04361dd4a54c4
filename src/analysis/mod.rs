//! Interaction analysis delegated to an external generative-AI model.
//!
//! The model gets a structured prompt built from the patient profile and is
//! asked to answer in a fixed JSON shape. The parser is deliberately lenient
//! about that shape since model output drifts between versions.

pub mod client;
pub mod parser;
pub mod prompt;
pub mod service;

pub use client::{GeminiClient, LlmClient, MockLlmClient};
pub use parser::parse_analysis_response;
pub use prompt::{build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
pub use service::InteractionAnalyzer;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid analysis request: {0}")]
    InvalidRequest(String),

    #[error("No API key configured for the analysis model")]
    MissingApiKey,

    #[error("Cannot reach the analysis model at {0}")]
    Connection(String),

    #[error("Analysis model timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Analysis model returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Analysis model returned no content: {0}")]
    EmptyResponse(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}

impl AnalysisError {
    /// Errors caused by the upstream service rather than the caller.
    pub fn is_upstream(&self) -> bool {
        !matches!(self, Self::InvalidRequest(_))
    }
}
