//! Intake form handling: validation, the end-to-end assessment pipeline, and
//! its HTTP routes.

pub mod domain;
pub mod report;
pub mod router;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    attachment_name, sanitize_filename, AssessmentSubmission, ContactInfo, LeadId, ServiceType,
    SubmittedEvidence, TargetInfo,
};
pub use report::{AssessmentReport, RiskSource, ANALYSIS_UNAVAILABLE_NOTICE, NO_PARTNERS_NOTICE};
pub use router::assessment_router;
pub use service::AssessmentService;
pub use validation::{validate_submission, IntakeViolation, MAX_ATTACHMENTS};
