use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single normalized row of the uploaded deposit file.
/// `row` is the zero-based position in original upload order.
#[derive(Debug, Clone)]
pub struct UploadedRecord {
    pub row: usize,
    pub name: String,
    pub date: NaiveDate,
    pub client_id: String,
    pub deposit_cents: i64,
}

/// One row of the reference activity ledger. Immutable, loaded once per run.
#[derive(Debug, Clone)]
pub struct ReferenceRecord {
    pub account_id: String,
    pub date: NaiveDate,
    pub last_activity: Option<NaiveDate>,
    pub activity_set: String,
    pub deposit_amount_cents: Option<i64>,
    pub deposit_distribution: String,
}

// ---------------------------------------------------------------------------
// Duplicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTag {
    Original,
    DroppedDuplicate,
}

impl std::fmt::Display for DuplicateTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Original => write!(f, "Original"),
            Self::DroppedDuplicate => write!(f, "Dropped Duplicate"),
        }
    }
}

/// Rows sharing one (client, date) key. `rows` is in original upload order;
/// the first entry is the `Original`.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    pub client_id: String,
    pub date: NaiveDate,
    pub rows: Vec<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    pub groups: Vec<DuplicateGroup>,
    /// Tag per flagged row index. Rows outside any group carry no tag.
    pub tags: BTreeMap<usize, DuplicateTag>,
    /// flagged_rows / 2 — exact only when every group has size 2.
    /// Groups of three or more undercount; `groups` holds the accurate
    /// breakdown next to it.
    pub pair_count: usize,
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// Remark finalized on each output row. The wire value is the display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remark {
    None,
    NoPreviousDate,
}

impl std::fmt::Display for Remark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::NoPreviousDate => write!(f, "No previous date found"),
        }
    }
}

impl Serialize for Remark {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An uploaded record merged with its exact-date reference match (left join,
/// all reference fields optional) and the strictly-prior as-of lookup.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub upload: UploadedRecord,
    pub overall_deposit_cents: Option<i64>,
    pub deposit_distribution: Option<String>,
    pub previous_activity: Option<NaiveDate>,
    pub previous_activity_set: Option<String>,
    pub remark: Remark,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Valid,
    Invalid,
    NoPreviousDate,
    NoEntryFound,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid => write!(f, "invalid"),
            Self::NoPreviousDate => write!(f, "No previous date found"),
            Self::NoEntryFound => write!(f, "No entry found for this trx"),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone)]
pub struct ClassifiedRecord {
    pub joined: JoinedRecord,
    pub status: Status,
    pub remark: Remark,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Final projection of one upload row, ready for export.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    pub cre: String,
    pub date: NaiveDate,
    pub client_id: String,
    pub first_deposit_cents: i64,
    pub remaining_deposit_cents: Option<i64>,
    pub overall_deposit_cents: Option<i64>,
    pub previous_activity: Option<NaiveDate>,
    pub remark: Remark,
    pub status: Status,
}

// ---------------------------------------------------------------------------
// Summary + Report
// ---------------------------------------------------------------------------

/// Row/column shape of the upload as received.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UploadShape {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub shape: UploadShape,
    pub duplicate_pairs: usize,
    pub status_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationMeta {
    pub config_name: String,
    pub cooldown_days: i64,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub meta: ValidationMeta,
    pub summary: ValidationSummary,
    pub duplicates: DuplicateReport,
    pub rows: Vec<OutputRecord>,
}
