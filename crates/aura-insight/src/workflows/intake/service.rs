use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use super::domain::{attachment_name, AssessmentSubmission, LeadId};
use super::report::{AssessmentReport, RiskSource, ANALYSIS_UNAVAILABLE_NOTICE, NO_PARTNERS_NOTICE};
use super::validation::{validate_submission, IntakeViolation};
use crate::workflows::analysis::{
    explain_recommendations, parse_analysis, AnalysisGateway, AnalysisRequest,
};
use crate::workflows::assessment::{QuestionnaireAnswers, RiskScorer, ScoreBreakdown, ScoreProfile};
use crate::workflows::leads::{canonical_json, content_hash, LeadParts, LeadRecord, LeadStore};
use crate::workflows::partners::{sample_unique, AgencyRecord, Clock, DirectoryCache, SystemClock};

/// Runs one submission end to end: fingerprint, score, analysis, partner
/// matching, and lead capture. Collaborator failures degrade the report instead
/// of failing the request.
pub struct AssessmentService<L, G> {
    directory: Arc<DirectoryCache>,
    leads: Arc<L>,
    analysis: Arc<G>,
    scorer: RiskScorer,
    recommendation_count: usize,
    rng: Mutex<StdRng>,
    clock: Arc<dyn Clock>,
}

impl<L, G> AssessmentService<L, G>
where
    L: LeadStore + 'static,
    G: AnalysisGateway + 'static,
{
    pub fn new(
        directory: Arc<DirectoryCache>,
        leads: Arc<L>,
        analysis: Arc<G>,
        profile: ScoreProfile,
        recommendation_count: usize,
    ) -> Self {
        Self {
            directory,
            leads,
            analysis,
            scorer: RiskScorer::new(profile),
            recommendation_count,
            rng: Mutex::new(StdRng::from_entropy()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Reseeds the jitter and sampling source.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self { clock, ..self }
    }

    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    pub fn score(&self, answers: &QuestionnaireAnswers) -> ScoreBreakdown {
        self.scorer.score(answers, &mut *self.rng())
    }

    /// Normalized directory. May block on a refresh; see [`DirectoryCache::agencies`].
    pub fn partners(&self) -> Arc<Vec<AgencyRecord>> {
        self.directory.agencies()
    }

    /// Weighted draw of up to `count` distinct agencies from the current directory.
    /// Blocks like [`Self::partners`].
    pub fn recommend(&self, count: usize) -> Vec<AgencyRecord> {
        let agencies = self.directory.agencies();
        sample_unique(agencies.as_slice(), count, &mut *self.rng())
    }

    /// Blocking: reads the directory and writes the lead. Run it from
    /// `spawn_blocking` when called from async code.
    pub fn submit(
        &self,
        submission: AssessmentSubmission,
    ) -> Result<AssessmentReport, IntakeViolation> {
        validate_submission(&submission)?;

        let lead_id = LeadId::generate();
        let submitted_at = self.clock.now();
        let evidence = submission.evidence();

        let answers_json = canonical_json(&evidence)
            .map_err(|err| warn!(%lead_id, error = %err, "answers could not be serialized"))
            .ok();
        let fingerprint = content_hash(&evidence)
            .map_err(|err| warn!(%lead_id, error = %err, "content hash unavailable"))
            .ok();

        let breakdown = evidence
            .answers
            .as_ref()
            .map(|answers| self.score(answers));

        let request = AnalysisRequest {
            service_type: submission.service_type,
            answers: evidence.answers.clone(),
            details: evidence.details.clone(),
            target: evidence.target.clone(),
            heuristic_score: breakdown.as_ref().map(|breakdown| breakdown.score),
        };

        let analysis = match self
            .analysis
            .analyze(&request)
            .and_then(|raw| parse_analysis(&raw))
        {
            Ok(report) => Some(report),
            Err(err) => {
                warn!(%lead_id, error = %err, "analysis unavailable; continuing with heuristic score");
                None
            }
        };

        let analysis_risk = analysis
            .as_ref()
            .and_then(|report| report.risk_score)
            .map(|score| self.scorer.clamp(score));
        let (risk_score, risk_source) = match (&breakdown, analysis_risk) {
            (Some(breakdown), _) => (breakdown.score, RiskSource::Questionnaire),
            (None, Some(score)) => (score, RiskSource::Analysis),
            (None, None) => (self.scorer.clamp(0), RiskSource::Baseline),
        };
        let evidence_score = analysis.as_ref().and_then(|report| report.evidence_percent());

        let picked = self.recommend(self.recommendation_count);
        let recommendations = explain_recommendations(&*self.analysis, &request, picked);

        let attachments: Vec<String> = submission
            .attachments
            .iter()
            .map(|name| attachment_name(&lead_id, name))
            .collect();

        let mut report = AssessmentReport {
            lead_id,
            submitted_at,
            service_type: submission.service_type,
            risk_score,
            risk_source,
            breakdown,
            evidence_score,
            content_hash: fingerprint,
            analysis_notice: analysis.is_none().then_some(ANALYSIS_UNAVAILABLE_NOTICE),
            analysis,
            partner_notice: recommendations.is_empty().then_some(NO_PARTNERS_NOTICE),
            recommendations,
            attachments,
            lead_persisted: false,
        };

        let partner_names = report.partner_names();
        let record = LeadRecord::assemble(
            LeadParts {
                contact: Some(&submission.contact),
                risk_score: Some(report.risk_score),
                evidence_score: report.evidence_score,
                service_type: Some(report.service_type),
                answers_json: answers_json.as_deref(),
                content_hash: report.content_hash.as_ref(),
                recommended: &partner_names,
                lead_id: Some(&report.lead_id),
                attachments: report.attachments.len(),
            },
            submitted_at,
        );

        match self.leads.append(&record) {
            Ok(()) => report.lead_persisted = true,
            Err(err) => {
                error!(lead_id = %report.lead_id, error = %err, "lead could not be stored; report still returned");
            }
        }

        info!(
            lead_id = %report.lead_id,
            service = report.service_type.label(),
            risk_score = report.risk_score.value(),
            partners = report.recommendations.len(),
            persisted = report.lead_persisted,
            "assessment completed"
        );

        Ok(report)
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
