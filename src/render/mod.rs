//! Result renderer: turns an `AnalysisResult` into the view model the
//! front-end draws (sections, tones, collapse state, clipboard text).

pub mod markdown;

pub use markdown::{markdown_to_plain, parse_markdown, strip_inline, MarkdownBlock};

use serde::Serialize;

use crate::models::{AnalysisResult, Interaction, InteractionCategory, RiskLevel};

/// Visual tone of a risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Danger,
    Warning,
    Caution,
    Safe,
    Neutral,
}

impl Tone {
    pub fn for_risk(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::High => Self::Danger,
            RiskLevel::Moderate => Self::Warning,
            RiskLevel::Low => Self::Caution,
            RiskLevel::None => Self::Safe,
            RiskLevel::Unknown => Self::Neutral,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Danger => "#dc2626",
            Self::Warning => "#d97706",
            Self::Caution => "#ca8a04",
            Self::Safe => "#16a34a",
            Self::Neutral => "#6b7280",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Caution => "caution",
            Self::Safe => "safe",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedItem {
    pub title: String,
    pub risk: RiskLevel,
    pub risk_label: &'static str,
    pub tone: Tone,
    pub color: &'static str,
    pub involved: Vec<String>,
    pub description: String,
    pub mechanism: Option<String>,
    pub management: Option<String>,
    pub evidence: Option<String>,
    pub copy_text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedSection {
    pub category: InteractionCategory,
    pub title: &'static str,
    pub count: usize,
    pub worst_risk: RiskLevel,
    pub tone: Tone,
    pub color: &'static str,
    pub collapsed: bool,
    pub empty: bool,
    pub items: Vec<RenderedItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedReport {
    pub summary: String,
    pub overall_risk: RiskLevel,
    pub overall_label: &'static str,
    pub overall_tone: Tone,
    pub overall_color: &'static str,
    pub sections: Vec<RenderedSection>,
    pub recommendations: Vec<String>,
    pub narrative: Vec<MarkdownBlock>,
    pub sources: Vec<String>,
    pub disclaimer: String,
    pub copy_text: String,
}

/// Clipboard block for one interaction. Absent optional fields are skipped.
pub fn item_copy_text(interaction: &Interaction) -> String {
    let mut lines = vec![
        strip_inline(&interaction.title),
        format!("Risk: {}", interaction.risk.label()),
    ];
    if !interaction.involved.is_empty() {
        lines.push(format!("Involved: {}", interaction.involved.join(", ")));
    }
    if !interaction.description.trim().is_empty() {
        lines.push(strip_inline(&interaction.description));
    }
    if let Some(mechanism) = interaction.mechanism.as_deref().filter(|m| !m.trim().is_empty()) {
        lines.push(format!("Mechanism: {}", strip_inline(mechanism)));
    }
    if let Some(management) = interaction.management.as_deref().filter(|m| !m.trim().is_empty()) {
        lines.push(format!("Management: {}", strip_inline(management)));
    }
    lines.join("\n")
}

fn render_item(interaction: &Interaction) -> RenderedItem {
    let tone = Tone::for_risk(interaction.risk);
    RenderedItem {
        title: strip_inline(&interaction.title),
        risk: interaction.risk,
        risk_label: interaction.risk.label(),
        tone,
        color: tone.color(),
        involved: interaction.involved.clone(),
        description: strip_inline(&interaction.description),
        mechanism: interaction.mechanism.as_deref().map(strip_inline),
        management: interaction.management.as_deref().map(strip_inline),
        evidence: interaction.evidence.clone(),
        copy_text: item_copy_text(interaction),
    }
}

/// One section per category in display order, empty ones included.
pub fn render_sections(result: &AnalysisResult) -> Vec<RenderedSection> {
    InteractionCategory::all()
        .iter()
        .map(|&category| {
            let mut interactions = result.in_category(category);
            // stable: equal risks keep model order
            interactions.sort_by(|a, b| b.risk.cmp(&a.risk));

            let worst_risk = if interactions.is_empty() {
                RiskLevel::None
            } else {
                RiskLevel::worst(interactions.iter().map(|i| i.risk))
            };
            let tone = Tone::for_risk(worst_risk);
            let expanded = interactions
                .iter()
                .any(|i| matches!(i.risk, RiskLevel::High | RiskLevel::Moderate));

            RenderedSection {
                category,
                title: category.title(),
                count: interactions.len(),
                worst_risk,
                tone,
                color: tone.color(),
                collapsed: !expanded,
                empty: interactions.is_empty(),
                items: interactions.into_iter().map(render_item).collect(),
            }
        })
        .collect()
}

fn report_copy_text(result: &AnalysisResult, sections: &[RenderedSection]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Overall risk: {}\n", result.overall_risk.label()));
    if !result.summary.trim().is_empty() {
        out.push_str(&strip_inline(&result.summary));
        out.push('\n');
    }

    for section in sections.iter().filter(|s| !s.empty) {
        out.push_str(&format!("\n{} ({})\n", section.title, section.count));
        for item in &section.items {
            out.push_str(&item.copy_text);
            out.push_str("\n\n");
        }
    }

    if !result.recommendations.is_empty() {
        out.push_str("\nRecommendations\n");
        for rec in &result.recommendations {
            out.push_str(&format!("• {}\n", strip_inline(rec)));
        }
    }
    out.trim_end().to_string()
}

pub fn render_report(result: &AnalysisResult) -> RenderedReport {
    let sections = render_sections(result);
    let tone = Tone::for_risk(result.overall_risk);
    RenderedReport {
        summary: strip_inline(&result.summary),
        overall_risk: result.overall_risk,
        overall_label: result.overall_risk.label(),
        overall_tone: tone,
        overall_color: tone.color(),
        copy_text: report_copy_text(result, &sections),
        recommendations: result.recommendations.iter().map(|r| strip_inline(r)).collect(),
        narrative: parse_markdown(&result.narrative),
        sources: result.sources.clone(),
        disclaimer: result.disclaimer.clone(),
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interaction::fixtures::{interaction, sample_result};

    #[test]
    fn one_section_per_category_in_order() {
        let sections = render_sections(&sample_result());
        let order: Vec<InteractionCategory> = sections.iter().map(|s| s.category).collect();
        assert_eq!(order, InteractionCategory::all());

        let dd = &sections[0];
        assert_eq!(dd.count, 1);
        assert_eq!(dd.tone, Tone::Danger);
        assert_eq!(dd.color, "#dc2626");
        assert!(!dd.collapsed);

        let beers = sections
            .iter()
            .find(|s| s.category == InteractionCategory::Beers)
            .unwrap();
        assert!(beers.empty);
        assert!(beers.collapsed);
        assert_eq!(beers.worst_risk, RiskLevel::None);
    }

    #[test]
    fn low_only_section_starts_collapsed() {
        let mut result = sample_result();
        result.interactions = vec![interaction(InteractionCategory::DrugCondition, RiskLevel::Low, "X")];
        let section = &render_sections(&result)[3];
        assert!(!section.empty);
        assert!(section.collapsed);
        assert_eq!(section.tone, Tone::Caution);
    }

    #[test]
    fn items_sorted_by_risk_stably() {
        let mut result = sample_result();
        result.interactions = vec![
            interaction(InteractionCategory::DrugDrug, RiskLevel::Low, "L1"),
            interaction(InteractionCategory::DrugDrug, RiskLevel::High, "H1"),
            interaction(InteractionCategory::DrugDrug, RiskLevel::Low, "L2"),
            interaction(InteractionCategory::DrugDrug, RiskLevel::Unknown, "U"),
            interaction(InteractionCategory::DrugDrug, RiskLevel::High, "H2"),
        ];
        let titles: Vec<String> = render_sections(&result)[0]
            .items
            .iter()
            .map(|i| i.title.clone())
            .collect();
        assert_eq!(titles, vec!["H1", "H2", "L1", "L2", "U"]);
    }

    #[test]
    fn item_fields_have_inline_markers_stripped() {
        let mut result = sample_result();
        let mut i = interaction(InteractionCategory::DrugDrug, RiskLevel::High, "**Warfarin** + Aspirin");
        i.mechanism = Some("*Additive* `antiplatelet` effect".into());
        i.management = Some("__Avoid__ combination".into());
        result.interactions = vec![i];

        let item = &render_sections(&result)[0].items[0];
        assert_eq!(item.title, "Warfarin + Aspirin");
        assert_eq!(item.mechanism.as_deref(), Some("Additive antiplatelet effect"));
        assert_eq!(item.management.as_deref(), Some("Avoid combination"));
    }

    #[test]
    fn tone_mapping() {
        assert_eq!(Tone::for_risk(RiskLevel::Moderate).color(), "#d97706");
        assert_eq!(Tone::for_risk(RiskLevel::None).as_str(), "safe");
        assert_eq!(Tone::for_risk(RiskLevel::Unknown).color(), "#6b7280");
    }

    #[test]
    fn item_copy_text_lists_fields() {
        let mut i = interaction(InteractionCategory::DrugDrug, RiskLevel::High, "Warfarin + Aspirin");
        i.mechanism = Some("**Additive** effect".into());
        let text = item_copy_text(&i);
        assert_eq!(
            text,
            "Warfarin + Aspirin\nRisk: High\nInvolved: Warfarin, Aspirin\nWarfarin + Aspirin description\nMechanism: Additive effect\nManagement: Monitor closely"
        );
    }

    #[test]
    fn report_copy_text_covers_everything() {
        let report = render_report(&sample_result());
        assert!(report.copy_text.starts_with("Overall risk: High"));
        assert!(report.copy_text.contains("Drug-Drug Interactions (1)"));
        assert!(report.copy_text.contains("Simvastatin + Grapefruit"));
        assert!(report.copy_text.contains("• Review antiplatelet need"));
        // empty sections are left out of the clipboard text
        assert!(!report.copy_text.contains("Beers"));
        assert_eq!(report.narrative.len(), 2);
        assert_eq!(report.overall_tone, Tone::Danger);
    }
}
