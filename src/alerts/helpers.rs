use std::sync::LazyLock;

use regex::Regex;

use super::reference::{class_members, resolve_brand};

/// Dose and strength tokens: "5mg", "0.5 g", "100 mcg", "10 ml", "1000iu".
static RE_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d+(?:[.,]\d+)?\s*(?:mg|mcg|µg|ug|g|ml|meq|iu|units?)?\b").unwrap()
});
static RE_PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());
static RE_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Salt and release-form words dropped when they trail a drug name.
const TRAILING_NOISE: &[&str] = &[
    "hydrochloride", "hcl", "sodium", "potassium", "calcium", "magnesium", "succinate",
    "tartrate", "besylate", "maleate", "mesylate", "citrate", "sulfate", "phosphate",
    "er", "xr", "sr", "xl", "cr", "dr", "la", "ir", "tablet", "tablets", "tab", "capsule",
    "capsules", "cap", "oral", "injection", "solution",
];

/// Canonical lowercase generic name for a free-text medication entry.
///
/// "Zocor 40mg" → "simvastatin", "Metoprolol Succinate ER" → "metoprolol",
/// "Potassium chloride" stays as is because the salt word leads.
pub fn normalize_drug_name(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    let without_parens = RE_PARENS.replace_all(&lower, " ");
    let without_dose = RE_DOSE.replace_all(&without_parens, " ");
    let collapsed = RE_SPACES.replace_all(without_dose.trim(), " ").to_string();

    let mut words: Vec<&str> = collapsed.split(' ').filter(|w| !w.is_empty()).collect();
    while words.len() > 1 && words.last().is_some_and(|w| TRAILING_NOISE.contains(w)) {
        words.pop();
    }
    let name = words.join(" ");

    match resolve_brand(&name) {
        Some(generic) => generic.to_string(),
        None => name,
    }
}

/// The whole normalized name plus each ingredient of a combination product
/// ("sulfamethoxazole-trimethoprim", "oxycodone/acetaminophen").
pub fn drug_components(normalized: &str) -> Vec<String> {
    let mut parts = vec![normalized.to_string()];
    let split = normalized
        .replace(" and ", "/")
        .replace(" with ", "/")
        .replace(['-', '+'], "/");
    if split.contains('/') {
        for part in split.split('/') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let resolved = resolve_brand(part).map(str::to_string).unwrap_or_else(|| part.to_string());
            if !parts.contains(&resolved) {
                parts.push(resolved);
            }
        }
    }
    parts
}

/// Whether any component matches a rule term (`"warfarin"` or `"@nsaid"`).
pub fn matches_term(components: &[String], term: &str) -> bool {
    match term.strip_prefix('@') {
        Some(class) => {
            let members = class_members(class);
            components.iter().any(|c| members.contains(&c.as_str()))
        }
        None => components.iter().any(|c| c == term),
    }
}

/// Lowercase and drop the allele punctuation so "HLA-B*57:01" reads "hla-b5701".
pub fn normalize_marker(raw: &str) -> String {
    raw.trim().to_lowercase().replace(['*', ':'], "")
}

/// True when any group has all of its keywords in `text`.
pub fn matches_keyword_groups(text: &str, groups: &[&[&str]]) -> bool {
    groups
        .iter()
        .any(|group| !group.is_empty() && group.iter().all(|kw| text.contains(kw)))
}
