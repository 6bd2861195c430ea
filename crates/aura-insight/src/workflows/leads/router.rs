use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::SecondsFormat;
use serde::Serialize;

use super::record::LeadRecord;
use super::store::{export_csv, LeadStore};
use crate::error::AppError;

pub const EXPORT_FILE_NAME: &str = "aura_insight_leads.csv";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Operator view over the lead store. Every route answers 404 while no token
/// is configured.
pub(crate) struct LeadAdmin<L> {
    store: Arc<L>,
    token: Option<String>,
}

impl<L> LeadAdmin<L> {
    fn authorize(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let expected = self.token.as_deref().ok_or(AppError::AdminDisabled)?;
        match presented_token(headers) {
            Some(token) if token == expected => Ok(()),
            _ => Err(AppError::Unauthorized),
        }
    }
}

/// `Authorization: Bearer <token>` or the `x-admin-token` header.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    bearer
        .or_else(|| {
            headers
                .get(ADMIN_TOKEN_HEADER)
                .and_then(|value| value.to_str().ok())
        })
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// One line of the lead listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadSummary {
    pub timestamp: String,
    pub service_type: String,
    pub name: String,
    pub phone: String,
    pub attachments: usize,
    pub lead_id: String,
}

impl From<&LeadRecord> for LeadSummary {
    fn from(record: &LeadRecord) -> Self {
        Self {
            timestamp: record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            service_type: record.service_type.clone(),
            name: record.name.clone(),
            phone: record.phone.clone(),
            attachments: record.attachments,
            lead_id: record.lead_id.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeadListing {
    pub count: usize,
    pub leads: Vec<LeadSummary>,
}

/// Lead listing and spreadsheet export, guarded by `token`.
pub fn lead_admin_router<L>(store: Arc<L>, token: Option<String>) -> Router
where
    L: LeadStore + 'static,
{
    let admin = LeadAdmin {
        store,
        token: token.filter(|token| !token.trim().is_empty()),
    };

    Router::new()
        .route("/api/v1/admin/leads", get(list_leads_handler::<L>))
        .route("/api/v1/admin/leads/export", get(export_leads_handler::<L>))
        .with_state(Arc::new(admin))
}

pub(crate) async fn list_leads_handler<L>(
    State(admin): State<Arc<LeadAdmin<L>>>,
    headers: HeaderMap,
) -> Result<Json<LeadListing>, AppError>
where
    L: LeadStore + 'static,
{
    admin.authorize(&headers)?;

    let store = Arc::clone(&admin.store);
    let records = tokio::task::spawn_blocking(move || store.list()).await??;
    let leads: Vec<LeadSummary> = records.iter().map(LeadSummary::from).collect();

    Ok(Json(LeadListing {
        count: leads.len(),
        leads,
    }))
}

pub(crate) async fn export_leads_handler<L>(
    State(admin): State<Arc<LeadAdmin<L>>>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    L: LeadStore + 'static,
{
    admin.authorize(&headers)?;

    let store = Arc::clone(&admin.store);
    let bytes = tokio::task::spawn_blocking(move || {
        let records = store.list()?;
        export_csv(&records)
    })
    .await??;

    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::{ContactInfo, LeadId, ServiceType};
    use crate::workflows::leads::{CsvLeadStore, LeadParts};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{TimeZone, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const TOKEN: &str = "night-shift-ledger";

    fn seeded_store(dir: &tempfile::TempDir) -> Arc<CsvLeadStore> {
        let store = CsvLeadStore::new(dir.path().join("leads.csv"));
        let contact = ContactInfo {
            name: "Kim Minji".to_string(),
            phone: "010-1234-5678".to_string(),
        };
        let lead_id = LeadId("3fa2b9c1".to_string());
        let submitted_at = Utc
            .with_ymd_and_hms(2025, 3, 14, 21, 5, 0)
            .single()
            .expect("valid timestamp");
        let record = LeadRecord::assemble(
            LeadParts {
                contact: Some(&contact),
                service_type: Some(ServiceType::EvidenceReview),
                lead_id: Some(&lead_id),
                attachments: 2,
                ..LeadParts::default()
            },
            submitted_at,
        );
        store.append(&record).expect("seed lead");
        Arc::new(store)
    }

    fn admin_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut request = Request::get(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        request.body(Body::empty()).unwrap()
    }

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body")
            .to_vec()
    }

    #[tokio::test]
    async fn authorized_listing_returns_lead_summaries() {
        let dir = tempfile::tempdir().expect("temp dir");
        let router = lead_admin_router(seeded_store(&dir), Some(TOKEN.to_string()));

        let response = router
            .oneshot(admin_request("/api/v1/admin/leads", Some(TOKEN)))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload: Value = serde_json::from_slice(&body_bytes(response).await).expect("json");
        assert_eq!(payload["count"], json!(1));
        assert_eq!(
            payload["leads"][0],
            json!({
                "timestamp": "2025-03-14T21:05:00Z",
                "service_type": "evidence_review",
                "name": "Kim Minji",
                "phone": "010-1234-5678",
                "attachments": 2,
                "lead_id": "3fa2b9c1",
            })
        );
    }

    #[tokio::test]
    async fn admin_header_is_accepted_in_place_of_bearer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let router = lead_admin_router(seeded_store(&dir), Some(TOKEN.to_string()));

        let response = router
            .oneshot(
                Request::get("/api/v1/admin/leads")
                    .header(ADMIN_TOKEN_HEADER, TOKEN)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_or_wrong_tokens_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let router = lead_admin_router(seeded_store(&dir), Some(TOKEN.to_string()));

        for token in [None, Some("guess")] {
            let response = router
                .clone()
                .oneshot(admin_request("/api/v1/admin/leads", token))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }

        let response = router
            .oneshot(admin_request("/api/v1/admin/leads/export", Some("guess")))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn routes_are_hidden_without_a_configured_token() {
        let dir = tempfile::tempdir().expect("temp dir");
        let router = lead_admin_router(seeded_store(&dir), Some("  ".to_string()));

        let response = router
            .oneshot(admin_request("/api/v1/admin/leads", Some("  ")))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn export_downloads_a_spreadsheet_with_byte_order_mark() {
        let dir = tempfile::tempdir().expect("temp dir");
        let router = lead_admin_router(seeded_store(&dir), Some(TOKEN.to_string()));

        let response = router
            .oneshot(admin_request("/api/v1/admin/leads/export", Some(TOKEN)))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_DISPOSITION),
            Some(&HeaderValue::from_static(
                "attachment; filename=\"aura_insight_leads.csv\""
            ))
        );
        let body = body_bytes(response).await;
        assert!(body.starts_with("\u{feff}timestamp,name,phone".as_bytes()));
        assert!(String::from_utf8_lossy(&body).contains("3fa2b9c1"));
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Arc::new(CsvLeadStore::new(dir.path().join("leads.csv")));
        let router = lead_admin_router(store, Some(TOKEN.to_string()));

        let response = router
            .oneshot(admin_request("/api/v1/admin/leads", Some(TOKEN)))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload: Value = serde_json::from_slice(&body_bytes(response).await).expect("json");
        assert_eq!(payload, json!({"count": 0, "leads": []}));
    }
}
