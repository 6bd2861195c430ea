use super::domain::{AssessmentSubmission, ServiceType};

pub const MAX_ATTACHMENTS: usize = 10;

/// Form-level problems that stop a submission before scoring starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeViolation {
    #[error("contact name and phone are required to receive the report")]
    MissingContact,
    #[error("consent to the confidentiality terms is required")]
    ConsentRequired,
    #[error("answer the questionnaire or describe the situation")]
    MissingEvidence,
    #[error("person search requires the subject's name and last known contact")]
    IncompleteTarget,
    #[error("at most {max} attachments may be submitted")]
    TooManyAttachments { max: usize },
}

pub fn validate_submission(submission: &AssessmentSubmission) -> Result<(), IntakeViolation> {
    if submission.contact.name.trim().is_empty() || submission.contact.phone.trim().is_empty() {
        return Err(IntakeViolation::MissingContact);
    }

    if !submission.consent {
        return Err(IntakeViolation::ConsentRequired);
    }

    let evidence = submission.evidence();
    if evidence.answers.is_none() && evidence.details.is_none() {
        return Err(IntakeViolation::MissingEvidence);
    }

    if submission.service_type == ServiceType::PersonSearch {
        let complete = submission.target.as_ref().is_some_and(|target| {
            !target.name.trim().is_empty() && !target.contact.trim().is_empty()
        });
        if !complete {
            return Err(IntakeViolation::IncompleteTarget);
        }
    }

    if submission.attachments.len() > MAX_ATTACHMENTS {
        return Err(IntakeViolation::TooManyAttachments {
            max: MAX_ATTACHMENTS,
        });
    }

    Ok(())
}
