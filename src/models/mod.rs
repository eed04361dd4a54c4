pub mod enums;
pub mod history;
pub mod interaction;
pub mod patient;

pub use enums::{InteractionCategory, RiskLevel};
pub use history::{request_fingerprint, HistoryEntry};
pub use interaction::{AnalysisResult, Interaction, DEFAULT_DISCLAIMER};
pub use patient::{AnalysisOptions, AnalysisRequest, PatientProfile, PatientRecord, BEERS_MIN_AGE};
