use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::analysis::{AnalysisError, AnalysisGateway, AnalysisRequest};
use crate::workflows::assessment::{QuestionnaireAnswers, ResponseLevel, ScoreProfile};
use crate::workflows::intake::{
    assessment_router, AssessmentService, AssessmentSubmission, ContactInfo, ServiceType,
    TargetInfo,
};
use crate::workflows::leads::{LeadRecord, LeadStore, LeadStoreError};
use crate::workflows::partners::{
    AgencyRecord, DirectoryCache, RawAgency, StaticDirectorySource,
};

pub(super) const SEED: u64 = 7;

pub(super) fn contact() -> ContactInfo {
    ContactInfo {
        name: "Kim Minji".to_string(),
        phone: "010-1234-5678".to_string(),
    }
}

pub(super) fn questionnaire_submission(level: ResponseLevel) -> AssessmentSubmission {
    AssessmentSubmission {
        service_type: ServiceType::InfidelityAnalysis,
        contact: contact(),
        answers: Some(QuestionnaireAnswers::uniform(level)),
        details: None,
        target: None,
        attachments: Vec::new(),
        consent: true,
    }
}

pub(super) fn free_text_submission() -> AssessmentSubmission {
    AssessmentSubmission {
        service_type: ServiceType::EvidenceReview,
        contact: contact(),
        answers: None,
        details: Some("Hotel receipts from a city they never mentioned visiting".to_string()),
        target: None,
        attachments: vec!["receipt (march).jpg".to_string()],
        consent: true,
    }
}

pub(super) fn person_search_submission() -> AssessmentSubmission {
    AssessmentSubmission {
        service_type: ServiceType::PersonSearch,
        contact: contact(),
        answers: None,
        details: Some("Lost touch after a business dispute in 2023".to_string()),
        target: Some(TargetInfo {
            name: "Choi Hyunwoo".to_string(),
            contact: "010-9999-0000".to_string(),
            location: "Incheon".to_string(),
        }),
        attachments: Vec::new(),
        consent: true,
    }
}

pub(super) fn directory_entries() -> Vec<RawAgency> {
    vec![
        RawAgency::named("Seoul Trace")
            .with_desc("Metro surveillance specialists")
            .with_weight(50.0),
        RawAgency::named("Busan Bureau").with_desc("Southern coastal coverage"),
        RawAgency::named("Daegu Insight").with_desc("Digital forensics"),
        RawAgency::named("Gwangju Watch").with_desc("Long-term tracing"),
        RawAgency::named("Jeju Harbor").with_desc("Island and travel cases"),
    ]
}

pub(super) fn directory(entries: Vec<RawAgency>) -> Arc<DirectoryCache> {
    Arc::new(DirectoryCache::new(
        Box::new(StaticDirectorySource::new(entries)),
        Duration::from_secs(600),
    ))
}

pub(super) fn build_service_with<L, G>(
    entries: Vec<RawAgency>,
    leads: Arc<L>,
    gateway: Arc<G>,
) -> AssessmentService<L, G>
where
    L: LeadStore + 'static,
    G: AnalysisGateway + 'static,
{
    AssessmentService::new(directory(entries), leads, gateway, ScoreProfile::standard(), 3)
        .with_seed(SEED)
}

pub(super) fn build_service() -> (
    AssessmentService<MemoryLeadStore, ScriptedGateway>,
    Arc<MemoryLeadStore>,
) {
    let leads = Arc::new(MemoryLeadStore::default());
    let service = build_service_with(
        directory_entries(),
        leads.clone(),
        Arc::new(ScriptedGateway::offline()),
    );
    (service, leads)
}

#[derive(Default, Clone)]
pub(super) struct MemoryLeadStore {
    records: Arc<Mutex<Vec<LeadRecord>>>,
}

impl MemoryLeadStore {
    pub(super) fn records(&self) -> Vec<LeadRecord> {
        self.records.lock().expect("lead mutex poisoned").clone()
    }
}

impl LeadStore for MemoryLeadStore {
    fn append(&self, record: &LeadRecord) -> Result<(), LeadStoreError> {
        self.records
            .lock()
            .expect("lead mutex poisoned")
            .push(record.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<LeadRecord>, LeadStoreError> {
        Ok(self.records())
    }
}

pub(super) struct FailingLeadStore;

impl LeadStore for FailingLeadStore {
    fn append(&self, _record: &LeadRecord) -> Result<(), LeadStoreError> {
        Err(LeadStoreError::Unavailable("sheet quota exceeded".to_string()))
    }

    fn list(&self) -> Result<Vec<LeadRecord>, LeadStoreError> {
        Err(LeadStoreError::Unavailable("sheet quota exceeded".to_string()))
    }
}

/// Gateway with canned replies; `None` makes the call fail.
#[derive(Debug, Default)]
pub(super) struct ScriptedGateway {
    analysis: Option<String>,
    reasons: Option<String>,
}

impl ScriptedGateway {
    pub(super) fn offline() -> Self {
        Self::default()
    }

    pub(super) fn replying(analysis: &str, reasons: &str) -> Self {
        Self {
            analysis: Some(analysis.to_string()),
            reasons: Some(reasons.to_string()),
        }
    }
}

impl AnalysisGateway for ScriptedGateway {
    fn analyze(&self, _request: &AnalysisRequest) -> Result<String, AnalysisError> {
        self.analysis
            .clone()
            .ok_or_else(|| AnalysisError::Unavailable("scripted outage".to_string()))
    }

    fn explain_matches(
        &self,
        _request: &AnalysisRequest,
        _agencies: &[AgencyRecord],
    ) -> Result<String, AnalysisError> {
        self.reasons
            .clone()
            .ok_or_else(|| AnalysisError::Unavailable("scripted outage".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: AssessmentService<MemoryLeadStore, ScriptedGateway>,
) -> axum::Router {
    assessment_router(Arc::new(service))
}
