use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::gateway::AnalysisError;
use crate::workflows::assessment::{QuestionnaireAnswers, RiskScore};
use crate::workflows::intake::{ServiceType, TargetInfo};

/// What the external generator is told about a submission. Contact details
/// never leave the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub service_type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<QuestionnaireAnswers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic_score: Option<RiskScore>,
}

/// Structured narrative returned by the generator. Every field is optional on
/// the wire, and nulls or mistyped values fall back to the default instead of
/// rejecting the whole report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisReport {
    #[serde(deserialize_with = "loose_score")]
    pub risk_score: Option<i64>,
    #[serde(deserialize_with = "loose_text")]
    pub summary: String,
    #[serde(deserialize_with = "loose_list")]
    pub key_findings: Vec<String>,
    #[serde(deserialize_with = "loose_score")]
    pub evidence_score: Option<i64>,
    #[serde(deserialize_with = "loose_list")]
    pub evidence_gaps: Vec<String>,
    #[serde(deserialize_with = "loose_list")]
    pub recommended_actions: Vec<String>,
}

/// Integers, floats (rounded) and numeric strings.
fn loose_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(score_value))
}

fn score_value(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Number(number) => {
            if let Some(whole) = number.as_i64() {
                return Some(whole);
            }
            number.as_f64()?
        }
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then(|| number.round() as i64)
}

fn loose_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

/// A list of strings; a lone string becomes a one-item list and non-string
/// items are dropped.
fn loose_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
        Some(Value::String(text)) if !text.trim().is_empty() => vec![text],
        _ => Vec::new(),
    })
}

impl AnalysisReport {
    /// Evidence readiness pinned to 0..=100.
    pub fn evidence_percent(&self) -> Option<u8> {
        self.evidence_score.map(|score| score.clamp(0, 100) as u8)
    }
}

/// Strips ```json ... ``` or ``` ... ``` fences around generator output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => {
            let stripped = stripped.trim_start();
            stripped
                .strip_suffix("```")
                .map(str::trim)
                .unwrap_or(stripped)
        }
        None => text,
    }
}

pub fn parse_analysis(raw: &str) -> Result<AnalysisReport, AnalysisError> {
    let body = strip_json_fences(raw);
    if body.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    Ok(serde_json::from_str(body)?)
}
