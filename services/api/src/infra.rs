use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use aura_insight::config::{AppConfig, LeadStoreConfig, PartnerConfig};
use aura_insight::workflows::analysis::OfflineAnalysisGateway;
use aura_insight::workflows::intake::AssessmentService;
use aura_insight::workflows::leads::CsvLeadStore;
use aura_insight::workflows::partners::{
    DirectoryCache, DirectoryError, DirectorySource, HttpDirectorySource, StaticDirectorySource,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::{info, warn};

pub(crate) type ApiAssessmentService = AssessmentService<CsvLeadStore, OfflineAnalysisGateway>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// HTTP directory when a URL is configured, otherwise an empty list so the
/// funnel keeps working without partner recommendations.
pub(crate) fn directory_source(
    config: &PartnerConfig,
) -> Result<Box<dyn DirectorySource>, DirectoryError> {
    match config.directory_url.as_deref() {
        Some(url) => {
            info!(%url, "partner directory configured");
            Ok(Box::new(HttpDirectorySource::from_current(url)?))
        }
        None => {
            warn!("PARTNER_DIRECTORY_URL not set; recommendations disabled");
            Ok(Box::new(StaticDirectorySource::empty()))
        }
    }
}

/// Shared by the intake pipeline and the admin listing.
pub(crate) fn lead_store(config: &LeadStoreConfig) -> Arc<CsvLeadStore> {
    Arc::new(CsvLeadStore::new(config.path.clone()))
}

pub(crate) fn assessment_service(
    config: &AppConfig,
    source: Box<dyn DirectorySource>,
    leads: Arc<CsvLeadStore>,
) -> Arc<ApiAssessmentService> {
    let directory = Arc::new(DirectoryCache::new(source, config.partners.cache_ttl));

    Arc::new(AssessmentService::new(
        directory,
        leads,
        Arc::new(OfflineAnalysisGateway),
        config.scoring.profile.profile(),
        config.partners.recommendation_count,
    ))
}
