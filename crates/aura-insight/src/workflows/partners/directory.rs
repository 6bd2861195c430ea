use std::collections::HashSet;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::warn;

use super::domain::{AgencyRecord, RawAgency};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory transport failed: {0}")]
    Transport(String),
    #[error("directory responded with HTTP {0}")]
    Status(u16),
    #[error("directory body is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("directory body must be a JSON array")]
    NotAnArray,
    #[error("directory file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("directory runtime unavailable: {0}")]
    Runtime(String),
}

/// Upstream list of partner agencies.
pub trait DirectorySource: Debug + Send + Sync {
    fn fetch(&self) -> Result<Vec<RawAgency>, DirectoryError>;
}

/// Fetches the published JSON list over HTTP. Only a 200 response is accepted.
///
/// `fetch` blocks on the runtime behind `handle`, so it must run on a blocking
/// thread (`spawn_blocking`) or outside the runtime entirely.
pub struct HttpDirectorySource {
    client: reqwest::Client,
    handle: Handle,
    url: String,
}

impl HttpDirectorySource {
    pub fn new(client: reqwest::Client, handle: Handle, url: impl Into<String>) -> Self {
        Self {
            client,
            handle,
            url: url.into(),
        }
    }

    /// Binds to the runtime the caller is running on.
    pub fn from_current(url: impl Into<String>) -> Result<Self, DirectoryError> {
        let handle = Handle::try_current().map_err(|err| DirectoryError::Runtime(err.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;
        Ok(Self::new(client, handle, url))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Debug for HttpDirectorySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDirectorySource")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl DirectorySource for HttpDirectorySource {
    fn fetch(&self) -> Result<Vec<RawAgency>, DirectoryError> {
        let body = self.handle.block_on(async {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|err| DirectoryError::Transport(err.to_string()))?;

            if response.status() != StatusCode::OK {
                return Err(DirectoryError::Status(response.status().as_u16()));
            }

            response
                .text()
                .await
                .map_err(|err| DirectoryError::Transport(err.to_string()))
        })?;

        parse_directory(&body)
    }
}

/// Reads the same JSON layout from disk.
#[derive(Debug, Clone)]
pub struct FileDirectorySource {
    path: PathBuf,
}

impl FileDirectorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DirectorySource for FileDirectorySource {
    fn fetch(&self) -> Result<Vec<RawAgency>, DirectoryError> {
        let body = std::fs::read_to_string(&self.path)?;
        parse_directory(&body)
    }
}

/// Fixed in-memory list; empty when no upstream is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectorySource {
    entries: Vec<RawAgency>,
}

impl StaticDirectorySource {
    pub fn new(entries: Vec<RawAgency>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl DirectorySource for StaticDirectorySource {
    fn fetch(&self) -> Result<Vec<RawAgency>, DirectoryError> {
        Ok(self.entries.clone())
    }
}

/// Parses a JSON array body. Elements that are not objects are skipped.
pub fn parse_directory(body: &str) -> Result<Vec<RawAgency>, DirectoryError> {
    let value: Value = serde_json::from_str(body.trim_start_matches('\u{feff}'))?;
    let Value::Array(items) = value else {
        return Err(DirectoryError::NotAnArray);
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawAgency>(item) {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(index, error = %err, "skipping malformed directory entry"),
        }
    }

    Ok(entries)
}

/// Normalizes raw entries, dropping unnamed ones and later duplicates of a name.
pub fn normalize_directory(entries: &[RawAgency]) -> Vec<AgencyRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let Some(record) = entry.normalize() else {
            warn!(index, "skipping directory entry without a name");
            continue;
        };

        if !seen.insert(record.name.clone()) {
            warn!(index, name = %record.name, "skipping duplicate directory entry");
            continue;
        }

        records.push(record);
    }

    records
}
