use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{AnalysisResult, Interaction, InteractionCategory, RiskLevel};

use super::AnalysisError;

static RE_THINKING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(think|thinking|reasoning)>.*?</(think|thinking|reasoning)>").unwrap()
});

/// Parsed model output, plus whether the model graded the analysis itself.
pub(crate) struct ParsedAnalysis {
    pub result: AnalysisResult,
    /// `false` when `overall_risk` was derived from the interactions.
    pub overall_risk_given: bool,
}

/// Parse the model's text into an `AnalysisResult`.
///
/// Accepts snake_case or camelCase keys, interactions either as a flat array
/// (each item carrying its `category`) or as an object keyed by category, and
/// tolerant risk strings. Without `overall_risk` the worst interaction risk
/// is used.
pub fn parse_analysis_response(response: &str) -> Result<AnalysisResult, AnalysisError> {
    parse_response(response).map(|parsed| parsed.result)
}

pub(crate) fn parse_response(response: &str) -> Result<ParsedAnalysis, AnalysisError> {
    let json_str = extract_json_object(response)?;
    let value: Value = serde_json::from_str(&json_str)
        .map_err(|e| AnalysisError::MalformedResponse(format!("invalid JSON: {e}")))?;
    let Value::Object(root) = value else {
        return Err(AnalysisError::MalformedResponse(
            "top-level JSON is not an object".into(),
        ));
    };

    let interactions = parse_interactions(&root);
    let has_known_field = ["summary", "overall_risk", "interactions", "narrative"]
        .iter()
        .any(|k| field(&root, k).is_some())
        || !interactions.is_empty();
    if !has_known_field {
        return Err(AnalysisError::MalformedResponse(
            "no analysis fields in response".into(),
        ));
    }

    let given = field(&root, "overall_risk")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty());
    let overall_risk = match given {
        Some(s) => RiskLevel::parse(s),
        None => RiskLevel::worst(interactions.iter().map(|i| i.risk)),
    };

    let result = AnalysisResult {
        summary: text_field(&root, &["summary", "overview"]).unwrap_or_default(),
        overall_risk,
        interactions,
        recommendations: string_list(field_any(&root, &["recommendations", "recommendation"])),
        narrative: text_field(&root, &["narrative", "explanation", "analysis"]).unwrap_or_default(),
        sources: string_list(field_any(&root, &["sources", "references"])),
        disclaimer: text_field(&root, &["disclaimer"]).unwrap_or_default(),
        model: String::new(),
    };
    Ok(ParsedAnalysis {
        result,
        overall_risk_given: given.is_some(),
    })
}

/// Strip thinking blocks and code fences, then take the outermost object.
///
/// A fenced block is used only when it parses on its own; string values may
/// carry their own fences, which would cut the block short.
fn extract_json_object(response: &str) -> Result<String, AnalysisError> {
    let cleaned = RE_THINKING.replace_all(response, "");
    let text = cleaned.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            let block = after[..end].trim();
            if block.starts_with('{') && serde_json::from_str::<Value>(block).is_ok() {
                return Ok(block.to_string());
            }
        }
    }

    find_outer_braces(text)
        .map(str::to_string)
        .ok_or_else(|| AnalysisError::MalformedResponse("no JSON object found".into()))
}

fn find_outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Key comparison ignoring case and separators: `overall_risk` == `overallRisk`.
fn key_form(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    let wanted = key_form(name);
    obj.iter()
        .find(|(k, v)| key_form(k) == wanted && !v.is_null())
        .map(|(_, v)| v)
}

fn field_any<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| field(obj, n))
}

fn text_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    match field_any(obj, names)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
    .filter(|s| !s.is_empty())
}

/// Array of strings (objects contribute their `text`/`title`), or a single
/// string split into lines.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(o) => text_field(o, &["text", "title", "recommendation", "name"]),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .lines()
            .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim().to_string())
            .filter(|l| !l.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_interactions(root: &Map<String, Value>) -> Vec<Interaction> {
    match field(root, "interactions") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| parse_interaction(item, None))
            .collect(),
        Some(Value::Object(by_category)) => parse_keyed(by_category),
        // Some models put the category arrays at the top level.
        _ => parse_keyed(root),
    }
}

fn parse_keyed(obj: &Map<String, Value>) -> Vec<Interaction> {
    let mut out = Vec::new();
    for (key, value) in obj {
        let Some(category) = InteractionCategory::from_key(key) else {
            continue;
        };
        if let Value::Array(items) = value {
            out.extend(items.iter().filter_map(|i| parse_interaction(i, Some(category))));
        }
    }
    out
}

fn parse_interaction(item: &Value, category: Option<InteractionCategory>) -> Option<Interaction> {
    let obj = item.as_object()?;

    let category = match category {
        Some(c) => c,
        None => {
            let key = field_any(obj, &["category", "type"]).and_then(Value::as_str)?;
            match InteractionCategory::from_key(key) {
                Some(c) => c,
                None => {
                    tracing::warn!(category = key, "Skipping interaction with unknown category");
                    return None;
                }
            }
        }
    };

    let involved = match field_any(obj, &["involved", "agents", "drugs", "items"]) {
        Some(Value::String(s)) => s
            .split(['+', ',', '/'])
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        other => string_list(other),
    };

    let title = text_field(obj, &["title", "name"]).unwrap_or_else(|| involved.join(" + "));
    if title.is_empty() {
        return None;
    }

    let risk = field_any(obj, &["risk", "risk_level", "severity"])
        .and_then(Value::as_str)
        .map(RiskLevel::parse)
        .unwrap_or(RiskLevel::Unknown);

    Some(Interaction {
        category,
        involved,
        risk,
        title,
        description: text_field(obj, &["description", "details", "effect"]).unwrap_or_default(),
        mechanism: text_field(obj, &["mechanism"]),
        management: text_field(obj, &["management", "recommendation", "action"]),
        evidence: text_field(obj, &["evidence", "evidence_level"]),
    })
}
