//! Lead row assembly, content fingerprinting, tabular persistence, and the
//! operator-facing lead listing.

mod fingerprint;
mod record;
pub mod router;
mod store;

pub use fingerprint::{canonical_json, content_hash, ContentHash};
pub use record::{LeadParts, LeadRecord, LEAD_COLUMNS, MISSING_VALUE};
pub use router::lead_admin_router;
pub use store::{export_csv, CsvLeadStore, LeadStore, LeadStoreError};
