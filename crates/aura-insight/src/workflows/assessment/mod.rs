//! Questionnaire model and heuristic risk scoring.

mod profile;
mod questionnaire;
mod scoring;

pub use profile::{ScoreProfile, ScoreProfileKind};
pub use questionnaire::{Question, QuestionnaireAnswers, ResponseLevel, QUESTIONS};
pub use scoring::{AnswerPoints, RiskScore, RiskScorer, ScoreBreakdown};
