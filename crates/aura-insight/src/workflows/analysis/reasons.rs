use std::collections::HashMap;

use tracing::warn;

use super::gateway::{AnalysisError, AnalysisGateway};
use super::report::{strip_json_fences, AnalysisRequest};
use crate::workflows::partners::{AgencyRecord, Recommendation};

/// Parses `{"Agency name": "reason", ...}`. Non-string values are ignored.
pub fn parse_reasons(raw: &str) -> Result<HashMap<String, String>, AnalysisError> {
    let body = strip_json_fences(raw);
    if body.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let value: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body)?;
    Ok(value
        .into_iter()
        .filter_map(|(name, reason)| match reason {
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Some((name.trim().to_string(), text.trim().to_string()))
            }
            _ => None,
        })
        .collect())
}

/// Pairs each agency with a generated reason, falling back to the agency's own
/// description when the generator fails or skips it. Order is preserved.
pub fn explain_recommendations<G>(
    gateway: &G,
    request: &AnalysisRequest,
    agencies: Vec<AgencyRecord>,
) -> Vec<Recommendation>
where
    G: AnalysisGateway + ?Sized,
{
    if agencies.is_empty() {
        return Vec::new();
    }

    let reasons = match gateway
        .explain_matches(request, &agencies)
        .and_then(|raw| parse_reasons(&raw))
    {
        Ok(reasons) => reasons,
        Err(err) => {
            warn!(error = %err, "partner reasons unavailable; using directory descriptions");
            HashMap::new()
        }
    };

    agencies
        .into_iter()
        .map(|agency| {
            let reason = reasons
                .get(&agency.name)
                .cloned()
                .unwrap_or_else(|| agency.description.clone());
            Recommendation { agency, reason }
        })
        .collect()
}
