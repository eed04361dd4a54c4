//! Proactive Alert Matcher: local rule tables checked against the patient
//! profile before (and independently of) the AI analysis.

pub mod detection;
pub mod helpers;
pub mod reference;
pub mod types;

pub use types::{AlertSeverity, ProactiveAlert};

use std::collections::HashSet;

use crate::models::{InteractionCategory, PatientProfile};

use detection::{
    detect_beers, detect_drug_allergy, detect_drug_condition, detect_drug_drug,
    detect_drug_substance, detect_pharmacogenetic, PreparedProfile,
};
use types::involved_key;

/// Stateless matcher over the static rule tables.
#[derive(Debug, Clone, Default)]
pub struct ProactiveAlertMatcher;

impl ProactiveAlertMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Scan every category.
    pub fn scan(&self, profile: &PatientProfile) -> Vec<ProactiveAlert> {
        self.scan_categories(profile, InteractionCategory::all())
    }

    /// Scan only the given categories. Output is deduplicated by
    /// (rule id, involved set) and sorted severity desc, then title.
    pub fn scan_categories(
        &self,
        profile: &PatientProfile,
        categories: &[InteractionCategory],
    ) -> Vec<ProactiveAlert> {
        if profile.is_empty() {
            return Vec::new();
        }
        let prepared = PreparedProfile::from_profile(profile);

        let mut alerts = Vec::new();
        for category in categories {
            let found = match category {
                InteractionCategory::DrugDrug => detect_drug_drug(&prepared),
                InteractionCategory::DrugSubstance => detect_drug_substance(&prepared),
                InteractionCategory::DrugAllergy => detect_drug_allergy(&prepared),
                InteractionCategory::DrugCondition => detect_drug_condition(&prepared),
                InteractionCategory::Pharmacogenetic => detect_pharmacogenetic(&prepared),
                InteractionCategory::Beers => detect_beers(&prepared),
            };
            alerts.extend(found);
        }

        let alerts = dedup_alerts(alerts);
        let critical = alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count();
        tracing::debug!(total = alerts.len(), critical, "Proactive alert scan complete");
        alerts
    }
}

/// Drop repeats of the same rule over the same involved set, then sort.
fn dedup_alerts(alerts: Vec<ProactiveAlert>) -> Vec<ProactiveAlert> {
    let mut seen = HashSet::new();
    let mut unique: Vec<ProactiveAlert> = alerts
        .into_iter()
        .filter(|a| seen.insert((a.rule_id.clone(), involved_key(&a.involved))))
        .collect();
    unique.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.title.cmp(&b.title)));
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> PatientProfile {
        PatientProfile {
            age: Some(78),
            medications: vec![
                "Warfarin 5mg".into(),
                "Aspirin 81mg".into(),
                "Diphenhydramine".into(),
                "Simvastatin".into(),
            ],
            substances: vec!["Grapefruit juice".into()],
            ..Default::default()
        }
    }

    #[test]
    fn empty_profile_yields_nothing() {
        let matcher = ProactiveAlertMatcher::new();
        assert!(matcher.scan(&PatientProfile::default()).is_empty());
    }

    #[test]
    fn sorted_by_severity_then_title() {
        let alerts = ProactiveAlertMatcher::new().scan(&profile());
        assert!(alerts.len() >= 3);
        for pair in alerts.windows(2) {
            assert!(
                pair[0].severity > pair[1].severity
                    || (pair[0].severity == pair[1].severity && pair[0].title <= pair[1].title)
            );
        }
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].rule_id, "dd-anticoag-antiplatelet");
    }

    #[test]
    fn categories_filter_applies() {
        let alerts = ProactiveAlertMatcher::new()
            .scan_categories(&profile(), &[InteractionCategory::Beers]);
        assert!(!alerts.is_empty());
        assert!(alerts.iter().all(|a| a.category == InteractionCategory::Beers));
    }

    #[test]
    fn duplicate_entries_do_not_duplicate_alerts() {
        let mut p = profile();
        // Different spelling, same drug: normalized() keeps both, dedup must not.
        p.medications.push("Coumadin".into());
        let alerts = ProactiveAlertMatcher::new().scan(&p);
        let ids: Vec<&String> = alerts.iter().map(|a| &a.id).collect();
        let unique: HashSet<&String> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn dedup_collapses_same_rule_same_set() {
        let a = ProactiveAlert::new(
            "r",
            InteractionCategory::DrugDrug,
            AlertSeverity::Info,
            "t",
            "m",
            "a",
            vec!["A".into(), "B".into()],
        );
        let b = ProactiveAlert::new(
            "r",
            InteractionCategory::DrugDrug,
            AlertSeverity::Info,
            "t",
            "m",
            "a",
            vec!["b".into(), "a".into()],
        );
        assert_eq!(dedup_alerts(vec![a, b]).len(), 1);
    }
}
