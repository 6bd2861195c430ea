use std::fmt::Debug;

use super::report::AnalysisRequest;
use crate::workflows::partners::AgencyRecord;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis backend unavailable: {0}")]
    Unavailable(String),
    #[error("analysis backend returned an empty response")]
    EmptyResponse,
    #[error("analysis response is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Boundary to the external text generator. Implementations return the raw
/// model output; parsing and fallbacks stay in this crate.
pub trait AnalysisGateway: Debug + Send + Sync {
    /// Narrative analysis of a submission, expected as an `AnalysisReport` JSON object.
    fn analyze(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;

    /// Per-agency justification, expected as a JSON object keyed by agency name.
    fn explain_matches(
        &self,
        request: &AnalysisRequest,
        agencies: &[AgencyRecord],
    ) -> Result<String, AnalysisError>;
}

/// Used when no generator is configured; every call reports itself unavailable
/// so the service takes its degraded path.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineAnalysisGateway;

impl AnalysisGateway for OfflineAnalysisGateway {
    fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalysisError> {
        Err(AnalysisError::Unavailable(
            "no analysis backend configured".to_string(),
        ))
    }

    fn explain_matches(
        &self,
        _request: &AnalysisRequest,
        _agencies: &[AgencyRecord],
    ) -> Result<String, AnalysisError> {
        Err(AnalysisError::Unavailable(
            "no analysis backend configured".to_string(),
        ))
    }
}
