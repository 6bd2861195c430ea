use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::domain::AssessmentSubmission;
use super::report::AssessmentReport;
use super::service::AssessmentService;
use super::validation::IntakeViolation;
use crate::error::AppError;
use crate::workflows::analysis::AnalysisGateway;
use crate::workflows::assessment::{QuestionnaireAnswers, ScoreBreakdown};
use crate::workflows::leads::LeadStore;

/// Router builder exposing the questionnaire, scoring, partner, and intake endpoints.
pub fn assessment_router<L, G>(service: Arc<AssessmentService<L, G>>) -> Router
where
    L: LeadStore + 'static,
    G: AnalysisGateway + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(submit_handler::<L, G>))
        .route("/api/v1/assessments/score", post(score_handler::<L, G>))
        .route("/api/v1/partners", get(partners_handler::<L, G>))
        .route("/api/v1/questionnaire", get(questionnaire_handler::<L, G>))
        .with_state(service)
}

pub(crate) async fn submit_handler<L, G>(
    State(service): State<Arc<AssessmentService<L, G>>>,
    Json(submission): Json<AssessmentSubmission>,
) -> Result<Json<AssessmentReport>, AppError>
where
    L: LeadStore + 'static,
    G: AnalysisGateway + 'static,
{
    // Directory fetches and lead writes block.
    let report = tokio::task::spawn_blocking(move || service.submit(submission)).await??;
    Ok(Json(report))
}

pub(crate) async fn score_handler<L, G>(
    State(service): State<Arc<AssessmentService<L, G>>>,
    Json(answers): Json<QuestionnaireAnswers>,
) -> Result<Json<ScoreBreakdown>, AppError>
where
    L: LeadStore + 'static,
    G: AnalysisGateway + 'static,
{
    if answers.is_empty() {
        return Err(IntakeViolation::MissingEvidence.into());
    }

    Ok(Json(service.score(&answers)))
}

pub(crate) async fn partners_handler<L, G>(
    State(service): State<Arc<AssessmentService<L, G>>>,
) -> Result<Json<Value>, AppError>
where
    L: LeadStore + 'static,
    G: AnalysisGateway + 'static,
{
    let agencies = tokio::task::spawn_blocking(move || service.partners()).await?;
    Ok(Json(json!({
        "count": agencies.len(),
        "agencies": agencies.as_slice(),
    })))
}

pub(crate) async fn questionnaire_handler<L, G>(
    State(service): State<Arc<AssessmentService<L, G>>>,
) -> Json<Value>
where
    L: LeadStore + 'static,
    G: AnalysisGateway + 'static,
{
    let profile = service.scorer().profile();
    Json(json!({
        "profile": profile.kind.label(),
        "questions": profile.questions,
        "labels": profile.labels(),
    }))
}
