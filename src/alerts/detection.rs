use crate::models::{InteractionCategory, PatientProfile};

use super::helpers::{
    drug_components, matches_keyword_groups, matches_term, normalize_drug_name, normalize_marker,
};
use super::reference::{
    substance_keywords, KeywordRule, BEERS_RULES, DRUG_ALLERGY_RULES, DRUG_CONDITION_RULES,
    DRUG_DRUG_RULES, DRUG_SUBSTANCE_RULES, PHARMACOGENETIC_RULES,
};
use super::types::{AlertSeverity, ProactiveAlert};

/// A medication or supplement with its normalized components.
#[derive(Debug, Clone)]
pub struct Agent {
    pub original: String,
    pub normalized: String,
    pub components: Vec<String>,
}

/// A free-text entry (allergy, condition, substance, marker) kept alongside
/// its matching form.
#[derive(Debug, Clone)]
pub struct TextEntry {
    pub original: String,
    pub matchable: String,
}

/// Profile reshaped once for all detectors.
#[derive(Debug, Clone, Default)]
pub struct PreparedProfile {
    pub agents: Vec<Agent>,
    pub substances: Vec<TextEntry>,
    pub allergies: Vec<TextEntry>,
    pub conditions: Vec<TextEntry>,
    pub markers: Vec<TextEntry>,
    pub elderly: bool,
}

impl PreparedProfile {
    pub fn from_profile(profile: &PatientProfile) -> Self {
        let profile = profile.normalized();
        let agents = profile
            .all_agents()
            .into_iter()
            .map(|original| {
                let normalized = normalize_drug_name(original);
                Agent {
                    original: original.to_string(),
                    components: drug_components(&normalized),
                    normalized,
                }
            })
            .collect();
        Self {
            agents,
            // Supplements are searched too: "grapefruit juice" often lands there.
            substances: lowered(&[profile.substances.clone(), profile.supplements.clone()].concat()),
            allergies: lowered(&profile.allergies),
            conditions: lowered(&profile.conditions),
            markers: profile
                .genetic_markers
                .iter()
                .map(|s| TextEntry {
                    original: s.clone(),
                    matchable: normalize_marker(s),
                })
                .collect(),
            elderly: profile.is_elderly(),
        }
    }
}

fn lowered(items: &[String]) -> Vec<TextEntry> {
    items
        .iter()
        .map(|s| TextEntry {
            original: s.clone(),
            matchable: s.to_lowercase(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Drug-drug
// ---------------------------------------------------------------------------

/// Symmetric pair rules across every distinct pair of agents.
pub fn detect_drug_drug(profile: &PreparedProfile) -> Vec<ProactiveAlert> {
    let mut alerts = Vec::new();
    let agents = &profile.agents;

    for rule in DRUG_DRUG_RULES {
        for (i, first) in agents.iter().enumerate() {
            for second in agents.iter().skip(i + 1) {
                let forward =
                    matches_term(&first.components, rule.a) && matches_term(&second.components, rule.b);
                let backward =
                    matches_term(&first.components, rule.b) && matches_term(&second.components, rule.a);
                if forward || backward {
                    alerts.push(ProactiveAlert::new(
                        rule.id,
                        InteractionCategory::DrugDrug,
                        rule.severity,
                        rule.title,
                        rule.message,
                        rule.action,
                        vec![first.original.clone(), second.original.clone()],
                    ));
                }
            }
        }
    }

    alerts
}

// ---------------------------------------------------------------------------
// Drug-substance
// ---------------------------------------------------------------------------

pub fn detect_drug_substance(profile: &PreparedProfile) -> Vec<ProactiveAlert> {
    let mut alerts = Vec::new();

    for rule in DRUG_SUBSTANCE_RULES {
        let keywords = substance_keywords(rule.b);
        let hits: Vec<&TextEntry> = profile
            .substances
            .iter()
            .filter(|s| keywords.iter().any(|kw| s.matchable.contains(kw)))
            .collect();
        if hits.is_empty() {
            continue;
        }
        for agent in profile.agents.iter().filter(|a| matches_term(&a.components, rule.a)) {
            for substance in &hits {
                alerts.push(ProactiveAlert::new(
                    rule.id,
                    InteractionCategory::DrugSubstance,
                    rule.severity,
                    rule.title,
                    rule.message,
                    rule.action,
                    vec![agent.original.clone(), substance.original.clone()],
                ));
            }
        }
    }

    alerts
}

// ---------------------------------------------------------------------------
// Keyword tables (allergy, condition, pharmacogenetic)
// ---------------------------------------------------------------------------

fn detect_keyword_rules(
    rules: &[KeywordRule],
    entries: &[TextEntry],
    agents: &[Agent],
    category: InteractionCategory,
) -> Vec<ProactiveAlert> {
    let mut alerts = Vec::new();

    for rule in rules {
        for entry in entries
            .iter()
            .filter(|e| matches_keyword_groups(&e.matchable, rule.keyword_groups))
        {
            for agent in agents.iter().filter(|a| matches_term(&a.components, rule.drug)) {
                alerts.push(ProactiveAlert::new(
                    rule.id,
                    category,
                    rule.severity,
                    rule.title,
                    rule.message,
                    rule.action,
                    vec![entry.original.clone(), agent.original.clone()],
                ));
            }
        }
    }

    alerts
}

/// Class cross-reactivity rules, plus a direct hit when the allergen names
/// the same drug the patient takes.
pub fn detect_drug_allergy(profile: &PreparedProfile) -> Vec<ProactiveAlert> {
    let mut alerts = detect_keyword_rules(
        DRUG_ALLERGY_RULES,
        &profile.allergies,
        &profile.agents,
        InteractionCategory::DrugAllergy,
    );

    for allergy in &profile.allergies {
        let allergen = normalize_drug_name(&allergy.original);
        if allergen.is_empty() {
            continue;
        }
        for agent in &profile.agents {
            if !agent.components.contains(&allergen) {
                continue;
            }
            let already_flagged = alerts.iter().any(|a| {
                a.involved.first() == Some(&allergy.original)
                    && a.involved.get(1) == Some(&agent.original)
            });
            if already_flagged {
                continue;
            }
            alerts.push(ProactiveAlert::new(
                "da-direct",
                InteractionCategory::DrugAllergy,
                AlertSeverity::Critical,
                &format!("Documented allergy to {}", agent.original),
                &format!(
                    "The patient is allergic to {} and the medication list contains it.",
                    allergy.original
                ),
                "Stop the medication and confirm the allergy history.",
                vec![allergy.original.clone(), agent.original.clone()],
            ));
        }
    }

    alerts
}

pub fn detect_drug_condition(profile: &PreparedProfile) -> Vec<ProactiveAlert> {
    detect_keyword_rules(
        DRUG_CONDITION_RULES,
        &profile.conditions,
        &profile.agents,
        InteractionCategory::DrugCondition,
    )
}

pub fn detect_pharmacogenetic(profile: &PreparedProfile) -> Vec<ProactiveAlert> {
    detect_keyword_rules(
        PHARMACOGENETIC_RULES,
        &profile.markers,
        &profile.agents,
        InteractionCategory::Pharmacogenetic,
    )
}

// ---------------------------------------------------------------------------
// Beers
// ---------------------------------------------------------------------------

/// Potentially inappropriate medications, only for patients aged 65+.
pub fn detect_beers(profile: &PreparedProfile) -> Vec<ProactiveAlert> {
    if !profile.elderly {
        return Vec::new();
    }

    let mut alerts = Vec::new();
    for rule in BEERS_RULES {
        for agent in profile.agents.iter().filter(|a| matches_term(&a.components, rule.drug)) {
            alerts.push(ProactiveAlert::new(
                rule.id,
                InteractionCategory::Beers,
                rule.severity,
                rule.title,
                rule.message,
                rule.action,
                vec![agent.original.clone()],
            ));
        }
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(meds: &[&str]) -> PreparedProfile {
        PreparedProfile::from_profile(&PatientProfile {
            medications: meds.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        })
    }

    #[test]
    fn drug_drug_is_symmetric() {
        let a = detect_drug_drug(&prepared(&["Warfarin", "Ibuprofen"]));
        let b = detect_drug_drug(&prepared(&["Ibuprofen", "Warfarin"]));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].id, b[0].id);
        assert_eq!(a[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn drug_drug_resolves_brands() {
        let alerts = detect_drug_drug(&prepared(&["Viagra 50mg", "Nitrostat"]));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule_id, "dd-pde5-nitrate");
        assert_eq!(alerts[0].involved, vec!["Viagra 50mg", "Nitrostat"]);
    }

    #[test]
    fn combination_product_component_matches() {
        let alerts = detect_drug_drug(&prepared(&["Methotrexate", "Bactrim"]));
        assert!(alerts.iter().any(|a| a.rule_id == "dd-methotrexate-trimethoprim"));
    }

    #[test]
    fn single_drug_has_no_pair_alert() {
        assert!(detect_drug_drug(&prepared(&["warfarin"])).is_empty());
    }

    #[test]
    fn substance_rule_matches_keyword() {
        let mut profile = PatientProfile {
            medications: vec!["Metronidazole".into()],
            substances: vec!["Red wine on weekends".into()],
            ..Default::default()
        };
        let alerts = detect_drug_substance(&PreparedProfile::from_profile(&profile));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);

        profile.substances.clear();
        assert!(detect_drug_substance(&PreparedProfile::from_profile(&profile)).is_empty());
    }

    #[test]
    fn penicillin_allergy_cross_reacts() {
        let profile = PatientProfile {
            medications: vec!["Augmentin".into(), "Keflex".into()],
            allergies: vec!["Penicillin (hives)".into()],
            ..Default::default()
        };
        let alerts = detect_drug_allergy(&PreparedProfile::from_profile(&profile));
        let ids: Vec<&str> = alerts.iter().map(|a| a.rule_id.as_str()).collect();
        assert!(ids.contains(&"da-penicillin"));
        assert!(ids.contains(&"da-penicillin-cephalosporin"));
    }

    #[test]
    fn direct_allergy_match() {
        let profile = PatientProfile {
            medications: vec!["Lisinopril 10mg".into()],
            allergies: vec!["lisinopril".into()],
            ..Default::default()
        };
        let alerts = detect_drug_allergy(&PreparedProfile::from_profile(&profile));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule_id, "da-direct");
    }

    #[test]
    fn condition_keyword_match() {
        let profile = PatientProfile {
            medications: vec!["Naproxen".into()],
            conditions: vec!["Chronic kidney disease stage 3".into()],
            ..Default::default()
        };
        let alerts = detect_drug_condition(&PreparedProfile::from_profile(&profile));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].rule_id, "dc-nsaid-renal");
    }

    #[test]
    fn pgx_allele_notation() {
        let profile = PatientProfile {
            medications: vec!["Abacavir".into()],
            genetic_markers: vec!["HLA-B*57:01 positive".into()],
            ..Default::default()
        };
        let alerts = detect_pharmacogenetic(&PreparedProfile::from_profile(&profile));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn beers_only_for_elderly() {
        let mut profile = PatientProfile {
            age: Some(64),
            medications: vec!["Benadryl".into()],
            ..Default::default()
        };
        assert!(detect_beers(&PreparedProfile::from_profile(&profile)).is_empty());
        profile.age = Some(72);
        let alerts = detect_beers(&PreparedProfile::from_profile(&profile));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].category, InteractionCategory::Beers);
    }
}
