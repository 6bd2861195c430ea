use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use super::record::{LeadRecord, LEAD_COLUMNS};

/// Byte order mark prepended to exports so spreadsheet tools detect UTF-8.
const UTF8_BOM: &str = "\u{feff}";

/// Append-only sink for completed leads.
pub trait LeadStore: Send + Sync {
    fn append(&self, record: &LeadRecord) -> Result<(), LeadStoreError>;

    /// Every stored lead, oldest first.
    fn list(&self) -> Result<Vec<LeadRecord>, LeadStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LeadStoreError {
    #[error("lead store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("lead row could not be written: {0}")]
    Csv(#[from] csv::Error),
    #[error("lead store unavailable: {0}")]
    Unavailable(String),
}

/// Spreadsheet-compatible CSV file. The header row is written when the file is
/// new or empty.
#[derive(Debug)]
pub struct CsvLeadStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLeadStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LeadStore for CsvLeadStore {
    fn append(&self, record: &LeadRecord) -> Result<(), LeadStoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(LEAD_COLUMNS)?;
        }
        writer.write_record(record.to_row())?;
        writer.flush()?;
        Ok(())
    }

    /// A missing or empty file holds no leads. Rows that no longer parse are
    /// skipped with a warning.
    fn list(&self) -> Result<Vec<LeadRecord>, LeadStoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            match LeadRecord::from_row(&row) {
                Some(record) => records.push(record),
                None => warn!(
                    path = %self.path.display(),
                    row = index + 1,
                    "skipping unreadable lead row"
                ),
            }
        }
        Ok(records)
    }
}

/// Spreadsheet download of `records`: a UTF-8 byte order mark, the header row,
/// then one row per lead.
pub fn export_csv(records: &[LeadRecord]) -> Result<Vec<u8>, LeadStoreError> {
    let mut buffer = UTF8_BOM.as_bytes().to_vec();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(LEAD_COLUMNS)?;
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}
