use crate::models::{AnalysisRequest, InteractionCategory, PatientProfile};

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"
You are a clinical pharmacology assistant supporting pharmacists and physicians.
You review a patient's medication list against their substances, allergies,
conditions, genetic markers and age, and report clinically relevant interactions.

RULES:
1. Report only interactions supported by established clinical evidence.
2. Grade each interaction as high, moderate, low or none.
3. Never invent patient data that is not in the profile.
4. Answer ONLY with a single JSON object matching the requested schema.
   No prose before or after it.
"#;

const RESPONSE_SCHEMA: &str = r#"{
  "summary": "one or two sentence overview",
  "overall_risk": "high | moderate | low | none",
  "interactions": [
    {
      "category": "drug_drug | drug_substance | drug_allergy | drug_condition | pharmacogenetic | beers",
      "involved": ["agent or factor", "agent or factor"],
      "risk": "high | moderate | low | none",
      "title": "short title",
      "description": "what happens and why it matters",
      "mechanism": "pharmacological mechanism or null",
      "management": "what the prescriber should do or null",
      "evidence": "guideline or evidence level or null"
    }
  ],
  "recommendations": ["actionable recommendation"],
  "narrative": "markdown explanation using ## headings and - bullets",
  "sources": ["reference"]
}"#;

fn language_name(code: &str) -> &str {
    match code.trim().to_lowercase().as_str() {
        "en" | "" => "English",
        "fr" => "French",
        "de" => "German",
        "es" => "Spanish",
        "it" => "Italian",
        "pt" => "Portuguese",
        "nl" => "Dutch",
        _ => code,
    }
}

fn push_section(out: &mut String, title: &str, items: &[String]) {
    out.push_str(title);
    out.push_str(":\n");
    if items.is_empty() {
        out.push_str("- none reported\n");
    } else {
        for item in items {
            out.push_str("- ");
            out.push_str(item);
            out.push('\n');
        }
    }
    out.push('\n');
}

fn category_instruction(category: InteractionCategory, profile: &PatientProfile) -> String {
    let detail = match category {
        InteractionCategory::DrugDrug => "interactions between any two medications or supplements",
        InteractionCategory::DrugSubstance => {
            "interactions with alcohol, food, tobacco and other listed substances"
        }
        InteractionCategory::DrugAllergy => {
            "medications that match or cross-react with a listed allergy"
        }
        InteractionCategory::DrugCondition => {
            "medications contraindicated or cautioned in a listed condition"
        }
        InteractionCategory::Pharmacogenetic => {
            "gene-drug interactions for the listed genetic markers (CPIC/DPWG)"
        }
        InteractionCategory::Beers => {
            if profile.is_elderly() {
                "potentially inappropriate medications per the AGS Beers Criteria"
            } else {
                "AGS Beers Criteria (patient is under 65: report only if clearly relevant)"
            }
        }
    };
    format!("- {}: {}\n", category.as_str(), detail)
}

/// Build the user prompt for one analysis request.
pub fn build_analysis_prompt(request: &AnalysisRequest) -> String {
    let profile = &request.profile;
    let mut out = String::with_capacity(2048);

    out.push_str("<patient>\n");
    match profile.age {
        Some(age) => out.push_str(&format!("Age: {age}\n")),
        None => out.push_str("Age: unknown\n"),
    }
    if let Some(sex) = &profile.sex {
        out.push_str(&format!("Sex: {sex}\n"));
    }
    out.push('\n');
    push_section(&mut out, "Medications", &profile.medications);
    push_section(&mut out, "Supplements", &profile.supplements);
    push_section(&mut out, "Substances", &profile.substances);
    push_section(&mut out, "Allergies", &profile.allergies);
    push_section(&mut out, "Conditions", &profile.conditions);
    push_section(&mut out, "Genetic markers", &profile.genetic_markers);
    out.push_str("</patient>\n\n");

    out.push_str("Check the following interaction categories:\n");
    for category in request.options.effective_categories() {
        out.push_str(&category_instruction(category, profile));
    }
    out.push_str(
        "\nReturn an empty interactions array for a category with no findings.\n\n",
    );

    out.push_str("Respond with JSON in exactly this shape:\n");
    out.push_str(RESPONSE_SCHEMA);
    out.push_str("\n\n");
    out.push_str(&format!(
        "Write all text values in {}. Keep the JSON keys and category keys in English.\n",
        language_name(&request.options.language)
    ));

    out
}
