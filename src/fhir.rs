//! Simulated FHIR import: maps a minimal R4 `Bundle` to a `PatientRecord`.
//!
//! Only the handful of resources a medication review needs are read;
//! everything else in the bundle is skipped.

use chrono::{Datelike, NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{PatientProfile, PatientRecord};

#[derive(Error, Debug)]
pub enum FhirError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Not a FHIR Bundle (resourceType = {0})")]
    NotABundle(String),

    #[error("Bundle has no entry array")]
    MissingEntries,
}

/// What was read from the bundle besides the record itself.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ImportStats {
    pub resources: usize,
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FhirImport {
    pub record: PatientRecord,
    pub stats: ImportStats,
}

pub fn import_bundle_str(json: &str) -> Result<FhirImport, FhirError> {
    let value: Value = serde_json::from_str(json)?;
    import_bundle(&value)
}

pub fn import_bundle(bundle: &Value) -> Result<FhirImport, FhirError> {
    let resource_type = bundle
        .get("resourceType")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if resource_type != "Bundle" {
        return Err(FhirError::NotABundle(resource_type.to_string()));
    }
    let entries = bundle
        .get("entry")
        .and_then(Value::as_array)
        .ok_or(FhirError::MissingEntries)?;

    let mut profile = PatientProfile::default();
    let mut label = None;
    let mut patient_id = None;
    let mut stats = ImportStats::default();

    for resource in entries.iter().filter_map(|e| e.get("resource")) {
        stats.resources += 1;
        let kind = resource.get("resourceType").and_then(Value::as_str).unwrap_or("");
        let taken = match kind {
            "Patient" => {
                patient_id = resource.get("id").and_then(Value::as_str).map(str::to_string);
                label = patient_name(resource);
                profile.sex = resource
                    .get("gender")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                profile.age = resource
                    .get("birthDate")
                    .and_then(Value::as_str)
                    .and_then(|d| age_from_birth_date(d, Utc::now().date_naive()));
                true
            }
            "MedicationStatement" | "MedicationRequest" => {
                push_some(&mut profile.medications, medication_name(resource))
            }
            "AllergyIntolerance" => push_some(&mut profile.allergies, code_text(resource, "code")),
            "Condition" => push_some(&mut profile.conditions, code_text(resource, "code")),
            other => {
                tracing::debug!(resource_type = other, "Ignoring FHIR resource");
                false
            }
        };
        if taken {
            stats.imported += 1;
        } else {
            stats.skipped += 1;
        }
    }

    tracing::info!(
        resources = stats.resources,
        imported = stats.imported,
        medications = profile.medications.len(),
        "FHIR bundle imported"
    );

    Ok(FhirImport {
        record: PatientRecord {
            id: patient_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            label: label.unwrap_or_else(|| "Imported patient".to_string()),
            profile: profile.normalized(),
        },
        stats,
    })
}

fn push_some(list: &mut Vec<String>, value: Option<String>) -> bool {
    match value {
        Some(v) => {
            list.push(v);
            true
        }
        None => false,
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// `CodeableConcept.text`, else the first coding `display`.
fn concept_text(concept: &Value) -> Option<String> {
    if let Some(text) = concept.get("text").and_then(Value::as_str).and_then(non_blank) {
        return Some(text);
    }
    concept
        .get("coding")
        .and_then(Value::as_array)?
        .iter()
        .find_map(|c| c.get("display").and_then(Value::as_str).and_then(non_blank))
}

fn code_text(resource: &Value, field: &str) -> Option<String> {
    resource.get(field).and_then(concept_text)
}

fn medication_name(resource: &Value) -> Option<String> {
    if let Some(name) = code_text(resource, "medicationCodeableConcept") {
        return Some(name);
    }
    // R5-style `medication.concept`
    resource
        .get("medication")
        .and_then(|m| m.get("concept"))
        .and_then(concept_text)
}

/// `given family`, or the `text` form.
fn patient_name(patient: &Value) -> Option<String> {
    let name = patient.get("name")?.as_array()?.first()?;
    if let Some(text) = name.get("text").and_then(Value::as_str).and_then(non_blank) {
        return Some(text);
    }
    let mut parts: Vec<&str> = name
        .get("given")
        .and_then(Value::as_array)
        .map(|g| g.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    if let Some(family) = name.get("family").and_then(Value::as_str) {
        parts.push(family);
    }
    non_blank(&parts.join(" "))
}

/// Whole years between a `YYYY-MM-DD` (or `YYYY`) birth date and `today`.
pub fn age_from_birth_date(birth_date: &str, today: NaiveDate) -> Option<u32> {
    let birth = NaiveDate::parse_from_str(birth_date.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| {
            let year: i32 = birth_date.trim().get(..4)?.parse().ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1)
        })?;
    if birth > today {
        return None;
    }
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    u32::try_from(age).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bundle() -> Value {
        json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [
                {"resource": {
                    "resourceType": "Patient",
                    "id": "pat-1",
                    "name": [{"given": ["Jane"], "family": "Doe"}],
                    "gender": "female",
                    "birthDate": "1950-06-15"
                }},
                {"resource": {
                    "resourceType": "MedicationStatement",
                    "medicationCodeableConcept": {"text": "Warfarin 5 mg"}
                }},
                {"resource": {
                    "resourceType": "MedicationRequest",
                    "medicationCodeableConcept": {
                        "coding": [{"system": "http://www.nlm.nih.gov/research/umls/rxnorm", "display": "Aspirin 81 MG"}]
                    }
                }},
                {"resource": {
                    "resourceType": "AllergyIntolerance",
                    "code": {"text": "Penicillin"}
                }},
                {"resource": {
                    "resourceType": "Condition",
                    "code": {"text": "Chronic kidney disease"}
                }},
                {"resource": {"resourceType": "Observation", "code": {"text": "INR"}}}
            ]
        })
    }

    #[test]
    fn maps_supported_resources() {
        let import = import_bundle(&bundle()).unwrap();
        let record = import.record;
        assert_eq!(record.id, "pat-1");
        assert_eq!(record.label, "Jane Doe");
        assert_eq!(record.profile.sex.as_deref(), Some("female"));
        assert!(record.profile.age.unwrap() >= 74);
        assert_eq!(record.profile.medications, vec!["Warfarin 5 mg", "Aspirin 81 MG"]);
        assert_eq!(record.profile.allergies, vec!["Penicillin"]);
        assert_eq!(record.profile.conditions, vec!["Chronic kidney disease"]);
        assert_eq!(
            import.stats,
            ImportStats {
                resources: 6,
                imported: 5,
                skipped: 1
            }
        );
    }

    #[test]
    fn missing_entry_array_is_error() {
        let err = import_bundle(&json!({"resourceType": "Bundle"})).unwrap_err();
        assert!(matches!(err, FhirError::MissingEntries));
    }

    #[test]
    fn non_bundle_is_error() {
        let err = import_bundle(&json!({"resourceType": "Patient"})).unwrap_err();
        assert!(matches!(err, FhirError::NotABundle(t) if t == "Patient"));
        assert!(matches!(import_bundle_str("{"), Err(FhirError::InvalidJson(_))));
    }

    #[test]
    fn empty_bundle_gives_default_record() {
        let import = import_bundle(&json!({"resourceType": "Bundle", "entry": []})).unwrap();
        assert_eq!(import.record.label, "Imported patient");
        assert!(import.record.profile.is_empty());
    }

    #[test]
    fn age_calculation() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
        assert_eq!(age_from_birth_date("1950-06-15", today), Some(74));
        assert_eq!(age_from_birth_date("1950-06-14", today), Some(75));
        assert_eq!(age_from_birth_date("1980", today), Some(45));
        assert_eq!(age_from_birth_date("2030-01-01", today), None);
        assert_eq!(age_from_birth_date("garbage", today), None);
    }
}
