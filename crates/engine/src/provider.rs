//! Reference data provider seam.
//!
//! The engine never fetches anything itself — it is handed a
//! `ReferenceTable` through this trait, once per run. Transport lives
//! behind the seam; the shipped implementation reads a local CSV file.

use std::path::PathBuf;

use crate::engine::load_reference_table;
use crate::error::EngineError;
use crate::joiner::ReferenceTable;

pub trait ReferenceSource {
    fn fetch(&self) -> Result<ReferenceTable, EngineError>;
}

/// CSV file on disk with the reference ledger schema
/// (accountId, Date, last_activity, activity_set, deposit_amount,
/// deposit_distribution).
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReferenceSource for CsvFileSource {
    fn fetch(&self) -> Result<ReferenceTable, EngineError> {
        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            EngineError::ReferenceFetch(format!("cannot read {}: {e}", self.path.display()))
        })?;
        load_reference_table(&data)
    }
}
