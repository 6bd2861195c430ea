use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{LeadId, ServiceType};
use crate::workflows::analysis::AnalysisReport;
use crate::workflows::assessment::{RiskScore, ScoreBreakdown};
use crate::workflows::leads::ContentHash;
use crate::workflows::partners::Recommendation;

pub const NO_PARTNERS_NOTICE: &str = "No partner agencies are available right now.";
pub const ANALYSIS_UNAVAILABLE_NOTICE: &str =
    "Automated analysis is unavailable; the score below is based on your answers only.";

/// Where the headline risk figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSource {
    Questionnaire,
    Analysis,
    Baseline,
}

/// Everything shown to the visitor once a submission is accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    pub lead_id: LeadId,
    pub submitted_at: DateTime<Utc>,
    pub service_type: ServiceType,
    pub risk_score: RiskScore,
    pub risk_source: RiskSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<ScoreBreakdown>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence_score: Option<u8>,
    pub content_hash: Option<ContentHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_notice: Option<&'static str>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_notice: Option<&'static str>,
    pub attachments: Vec<String>,
    pub lead_persisted: bool,
}

impl AssessmentReport {
    pub fn partner_names(&self) -> Vec<String> {
        self.recommendations
            .iter()
            .map(|recommendation| recommendation.agency.name.clone())
            .collect()
    }
}
