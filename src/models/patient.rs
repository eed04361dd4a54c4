use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::enums::InteractionCategory;

/// Age from which Beers criteria apply.
pub const BEERS_MIN_AGE: u32 = 65;

/// Everything known about the patient that an interaction check can use.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientProfile {
    pub age: Option<u32>,
    pub sex: Option<String>,
    pub medications: Vec<String>,
    pub supplements: Vec<String>,
    /// Alcohol, grapefruit, tobacco, cannabis, caffeine...
    pub substances: Vec<String>,
    pub allergies: Vec<String>,
    pub conditions: Vec<String>,
    /// Free-text markers such as "CYP2C19 poor metabolizer" or "HLA-B*57:01 positive".
    pub genetic_markers: Vec<String>,
}

impl PatientProfile {
    /// Trim entries, drop blanks and case-insensitive duplicates (first spelling wins).
    pub fn normalized(&self) -> Self {
        Self {
            age: self.age,
            sex: self
                .sex
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            medications: clean_list(&self.medications),
            supplements: clean_list(&self.supplements),
            substances: clean_list(&self.substances),
            allergies: clean_list(&self.allergies),
            conditions: clean_list(&self.conditions),
            genetic_markers: clean_list(&self.genetic_markers),
        }
    }

    /// Medications followed by supplements, the list interaction rules scan.
    pub fn all_agents(&self) -> Vec<&str> {
        self.medications
            .iter()
            .chain(self.supplements.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn is_elderly(&self) -> bool {
        self.age.is_some_and(|a| a >= BEERS_MIN_AGE)
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty()
            && self.supplements.is_empty()
            && self.substances.is_empty()
            && self.allergies.is_empty()
            && self.conditions.is_empty()
            && self.genetic_markers.is_empty()
    }
}

fn clean_list(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// What the caller wants the analysis to cover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub categories: Vec<InteractionCategory>,
    /// ISO 639-1 code of the language the model should answer in.
    pub language: String,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            categories: InteractionCategory::all().to_vec(),
            language: "en".to_string(),
        }
    }
}

impl AnalysisOptions {
    /// Requested categories in display order, without duplicates.
    /// An empty selection means every category.
    pub fn effective_categories(&self) -> Vec<InteractionCategory> {
        if self.categories.is_empty() {
            return InteractionCategory::all().to_vec();
        }
        InteractionCategory::all()
            .iter()
            .copied()
            .filter(|c| self.categories.contains(c))
            .collect()
    }
}

/// A single interaction check as submitted by the front-end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub profile: PatientProfile,
    #[serde(default)]
    pub options: AnalysisOptions,
}

impl AnalysisRequest {
    /// Normalize the profile and check there is something to analyze.
    pub fn validated(&self) -> Result<Self, String> {
        let profile = self.profile.normalized();
        if profile.medications.is_empty() && profile.supplements.is_empty() {
            return Err("At least one medication or supplement is required".into());
        }
        if let Some(age) = profile.age {
            if age > 130 {
                return Err(format!("Implausible age: {age}"));
            }
        }
        Ok(Self {
            profile,
            options: self.options.clone(),
        })
    }
}

/// One patient in a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub label: String,
    pub profile: PatientProfile,
}
