use std::fmt;

use serde::{Deserialize, Serialize};

use crate::workflows::assessment::QuestionnaireAnswers;

/// Services offered on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    InfidelityAnalysis,
    PersonSearch,
    EvidenceReview,
}

impl ServiceType {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::InfidelityAnalysis => "infidelity_analysis",
            ServiceType::PersonSearch => "person_search",
            ServiceType::EvidenceReview => "evidence_review",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Person-search subject details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub location: String,
}

/// Completed intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentSubmission {
    pub service_type: ServiceType,
    #[serde(default)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub answers: Option<QuestionnaireAnswers>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub target: Option<TargetInfo>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub consent: bool,
}

impl AssessmentSubmission {
    pub fn evidence(&self) -> SubmittedEvidence {
        SubmittedEvidence {
            answers: self.answers.clone().filter(|answers| !answers.is_empty()),
            details: self
                .details
                .as_deref()
                .map(str::trim)
                .filter(|details| !details.is_empty())
                .map(str::to_string),
            target: self.target.clone(),
        }
    }
}

/// The part of a submission that is fingerprinted and stored as the answers column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubmittedEvidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<QuestionnaireAnswers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetInfo>,
}

/// Short public identifier handed back with each report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl LeadId {
    pub fn generate() -> Self {
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(8);
        Self(id)
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips everything but word characters, whitespace, dots, and dashes.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_' || ch.is_whitespace() || *ch == '.' || *ch == '-')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Storage name for an attachment: `{lead}_{suffix}_{sanitized}`.
pub fn attachment_name(lead_id: &LeadId, original: &str) -> String {
    let mut suffix = uuid::Uuid::new_v4().simple().to_string();
    suffix.truncate(6);
    format!("{}_{}_{}", lead_id, suffix, sanitize_filename(original))
}
