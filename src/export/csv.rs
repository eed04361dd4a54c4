use ::csv::Writer;
use serde::Serialize;

use crate::models::HistoryEntry;

use super::{join_list, ExportError};

#[derive(Serialize)]
struct HistoryRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Patient")]
    patient: String,
    #[serde(rename = "Medications")]
    medications: String,
    #[serde(rename = "Allergies")]
    allergies: String,
    #[serde(rename = "Conditions")]
    conditions: String,
    #[serde(rename = "Overall Risk")]
    overall_risk: &'static str,
    #[serde(rename = "Interactions")]
    interactions: usize,
    #[serde(rename = "High Risk")]
    high_risk: usize,
    #[serde(rename = "Summary")]
    summary: String,
}

#[derive(Serialize)]
struct InteractionRow {
    #[serde(rename = "Category")]
    category: &'static str,
    #[serde(rename = "Involved")]
    involved: String,
    #[serde(rename = "Risk")]
    risk: &'static str,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Mechanism")]
    mechanism: String,
    #[serde(rename = "Management")]
    management: String,
}

/// Spreadsheets evaluate cells starting with these as formulas.
fn neutralize(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, ExportError> {
    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// One row per history entry, newest first as given.
pub fn history_csv(entries: &[HistoryEntry]) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    if entries.is_empty() {
        // header only
        writer.write_record([
            "Date",
            "Patient",
            "Medications",
            "Allergies",
            "Conditions",
            "Overall Risk",
            "Interactions",
            "High Risk",
            "Summary",
        ])?;
    }
    for entry in entries {
        let profile = &entry.request.profile;
        let mut agents = profile.medications.clone();
        agents.extend(profile.supplements.iter().cloned());
        writer.serialize(HistoryRow {
            date: entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            patient: neutralize(&entry.patient_label),
            medications: neutralize(&join_list(&agents)),
            allergies: neutralize(&join_list(&profile.allergies)),
            conditions: neutralize(&join_list(&profile.conditions)),
            overall_risk: entry.result.overall_risk.label(),
            interactions: entry.result.interactions.len(),
            high_risk: entry.result.high_risk_count(),
            summary: neutralize(&entry.result.summary),
        })?;
    }
    tracing::debug!(rows = entries.len(), "History CSV written");
    finish(writer)
}

/// One row per interaction of the entry, worst risk first.
pub fn result_csv(entry: &HistoryEntry) -> Result<Vec<u8>, ExportError> {
    let mut writer = Writer::from_writer(Vec::new());
    let mut interactions: Vec<_> = entry.result.interactions.iter().collect();
    interactions.sort_by(|a, b| b.risk.cmp(&a.risk));

    if interactions.is_empty() {
        writer.write_record([
            "Category",
            "Involved",
            "Risk",
            "Title",
            "Description",
            "Mechanism",
            "Management",
        ])?;
    }
    for interaction in interactions {
        writer.serialize(InteractionRow {
            category: interaction.category.title(),
            involved: neutralize(&join_list(&interaction.involved)),
            risk: interaction.risk.label(),
            title: neutralize(&interaction.title),
            description: neutralize(&interaction.description),
            mechanism: neutralize(interaction.mechanism.as_deref().unwrap_or("")),
            management: neutralize(interaction.management.as_deref().unwrap_or("")),
        })?;
    }
    finish(writer)
}
