use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::fingerprint::ContentHash;
use crate::workflows::assessment::RiskScore;
use crate::workflows::intake::{ContactInfo, LeadId, ServiceType};

pub const MISSING_VALUE: &str = "N/A";

/// Column order of the lead sheet. The last two columns were added later, so
/// rows without them still read back.
pub const LEAD_COLUMNS: [&str; 11] = [
    "timestamp",
    "name",
    "phone",
    "risk_score",
    "evidence_score",
    "service_type",
    "answers",
    "content_hash",
    "recommended_partners",
    "lead_id",
    "attachments",
];

const REQUIRED_COLUMNS: usize = 9;

/// Inputs gathered over one submission. Every field may be absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadParts<'a> {
    pub contact: Option<&'a ContactInfo>,
    pub risk_score: Option<RiskScore>,
    pub evidence_score: Option<u8>,
    pub service_type: Option<ServiceType>,
    pub answers_json: Option<&'a str>,
    pub content_hash: Option<&'a ContentHash>,
    pub recommended: &'a [String],
    pub lead_id: Option<&'a LeadId>,
    pub attachments: usize,
}

/// One flat row destined for the lead store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRecord {
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub phone: String,
    pub risk_score: String,
    pub evidence_score: String,
    pub service_type: String,
    pub answers: String,
    pub content_hash: String,
    pub recommended_partners: String,
    pub lead_id: String,
    pub attachments: usize,
}

impl LeadRecord {
    /// Pure assembly; absent or blank inputs become [`MISSING_VALUE`].
    pub fn assemble(parts: LeadParts<'_>, timestamp: DateTime<Utc>) -> Self {
        let name = parts.contact.map(|contact| contact.name.as_str());
        let phone = parts.contact.map(|contact| contact.phone.as_str());
        let partners: Vec<&str> = parts
            .recommended
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect();

        Self {
            timestamp,
            name: or_missing(name),
            phone: or_missing(phone),
            risk_score: parts
                .risk_score
                .map(|score| score.value().to_string())
                .unwrap_or_else(|| MISSING_VALUE.to_string()),
            evidence_score: parts
                .evidence_score
                .map(|score| score.to_string())
                .unwrap_or_else(|| MISSING_VALUE.to_string()),
            service_type: or_missing(parts.service_type.map(|service| service.label())),
            answers: or_missing(parts.answers_json),
            content_hash: or_missing(parts.content_hash.map(|hash| hash.0.as_str())),
            recommended_partners: if partners.is_empty() {
                MISSING_VALUE.to_string()
            } else {
                partners.join(", ")
            },
            lead_id: or_missing(parts.lead_id.map(|id| id.0.as_str())),
            attachments: parts.attachments,
        }
    }

    /// Reads back a stored row. `None` when the timestamp is unreadable or
    /// one of the original nine columns is missing.
    pub fn from_row(row: &csv::StringRecord) -> Option<Self> {
        if row.len() < REQUIRED_COLUMNS {
            return None;
        }
        let cell = |index: usize| row.get(index).unwrap_or(MISSING_VALUE).to_string();
        let timestamp = DateTime::parse_from_rfc3339(row.get(0)?.trim())
            .ok()?
            .with_timezone(&Utc);

        Some(Self {
            timestamp,
            name: cell(1),
            phone: cell(2),
            risk_score: cell(3),
            evidence_score: cell(4),
            service_type: cell(5),
            answers: cell(6),
            content_hash: cell(7),
            recommended_partners: cell(8),
            lead_id: cell(9),
            attachments: row
                .get(10)
                .and_then(|count| count.trim().parse().ok())
                .unwrap_or(0),
        })
    }

    pub fn to_row(&self) -> [String; 11] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.name.clone(),
            self.phone.clone(),
            self.risk_score.clone(),
            self.evidence_score.clone(),
            self.service_type.clone(),
            self.answers.clone(),
            self.content_hash.clone(),
            self.recommended_partners.clone(),
            self.lead_id.clone(),
            self.attachments.to_string(),
        ]
    }
}

fn or_missing(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => MISSING_VALUE.to_string(),
    }
}
