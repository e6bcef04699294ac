//! Spreadsheet ingestion for admissions and test answer sheets.

pub mod admissions;
pub mod answers;
pub mod dates;
mod mapping;
mod normalizer;
pub mod sheet;

use std::path::Path;

pub use admissions::{parse_admissions, AdmissionBatch, RowIssue, StudentRecord};
pub use answers::{parse_reports, parse_solutions, ReportSheet};
pub use mapping::Field;
pub use sheet::{Sheet, SheetFormat};

use crate::scoring::Solution;

#[derive(Debug)]
pub enum IngestError {
    Io(std::io::Error),
    Csv(csv::Error),
    Workbook(calamine::Error),
    UnsupportedFormat(String),
    TooLarge { size: u64, limit: u64 },
    EmptyWorkbook,
    MissingColumns(Vec<&'static str>),
    InvalidRow { line: usize, message: String },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Io(err) => write!(f, "failed to read upload: {}", err),
            IngestError::Csv(err) => write!(f, "invalid CSV data: {}", err),
            IngestError::Workbook(err) => write!(f, "invalid spreadsheet: {}", err),
            IngestError::UnsupportedFormat(name) => {
                write!(f, "'{}' is not a CSV or Excel file", name)
            }
            IngestError::TooLarge { size, limit } => write!(
                f,
                "upload is {} bytes, larger than the {} byte limit",
                size, limit
            ),
            IngestError::EmptyWorkbook => write!(f, "spreadsheet has no rows"),
            IngestError::MissingColumns(columns) => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
            IngestError::InvalidRow { line, message } => write!(f, "row {}: {}", line, message),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io(err) => Some(err),
            IngestError::Csv(err) => Some(err),
            IngestError::Workbook(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        Self::Workbook(err)
    }
}

/// Admissions upload: size and type checks, then row validation.
pub fn import_admissions<P: AsRef<Path>>(
    path: P,
    max_bytes: u64,
) -> Result<AdmissionBatch, IngestError> {
    let sheet = Sheet::from_path(path, max_bytes)?;
    parse_admissions(&sheet)
}

pub fn import_solutions<P: AsRef<Path>>(
    path: P,
    max_bytes: u64,
) -> Result<Vec<Solution>, IngestError> {
    let sheet = Sheet::from_path(path, max_bytes)?;
    parse_solutions(&sheet)
}

pub fn import_reports<P: AsRef<Path>>(
    path: P,
    max_bytes: u64,
    test_name: &str,
    default_date: Option<chrono::NaiveDate>,
) -> Result<ReportSheet, IngestError> {
    let sheet = Sheet::from_path(path, max_bytes)?;
    parse_reports(&sheet, test_name, default_date)
}
