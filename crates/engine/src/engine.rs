use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::classify::classify;
use crate::config::ValidationConfig;
use crate::dedup::detect_duplicates;
use crate::error::EngineError;
use crate::joiner::{join_records, ReferenceTable};
use crate::model::{
    ReferenceRecord, UploadShape, UploadedRecord, ValidationMeta, ValidationReport,
};
use crate::money::parse_amount_cents;
use crate::report::{assemble, summarize};
use crate::schema::resolve_columns;

/// Run one validation over a pre-loaded reference table.
/// Single-threaded, single pass: normalize → dedup → join → classify →
/// assemble. Row-level anomalies become status values; only malformed
/// input kills the run.
pub fn run(
    config: &ValidationConfig,
    upload_csv: &str,
    reference: &ReferenceTable,
) -> Result<ValidationReport, EngineError> {
    let (shape, uploads) = load_upload_rows(upload_csv, &config.mapping)?;

    let duplicates = detect_duplicates(&uploads);
    let joined = join_records(&uploads, reference);
    let classified = joined
        .into_iter()
        .map(|j| classify(j, config.cooldown_days))
        .collect();
    let rows = assemble(classified);
    let summary = summarize(shape, &duplicates, &rows);

    Ok(ValidationReport {
        meta: ValidationMeta {
            config_name: config.name.clone(),
            cooldown_days: config.cooldown_days,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        duplicates,
        rows,
    })
}

/// Parse a calendar date, truncating any time-of-day component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

/// Load and normalize the uploaded deposit file.
///
/// Headers are resolved against the canonical schema (with `mapping`
/// overrides); cell-level parse failures carry row and column context
/// and are fatal.
pub fn load_upload_rows(
    csv_data: &str,
    mapping: &BTreeMap<String, String>,
) -> Result<(UploadShape, Vec<UploadedRecord>), EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EngineError::Io(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let cols = resolve_columns(&headers, mapping)?;

    let mut rows = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| EngineError::InputParse {
            row,
            column: "<record>".into(),
            value: e.to_string(),
        })?;

        let date_str = record.get(cols.date).unwrap_or("");
        let date = parse_date(date_str).ok_or_else(|| EngineError::InputParse {
            row,
            column: "Date".into(),
            value: date_str.into(),
        })?;

        let deposit_str = record.get(cols.deposit).unwrap_or("");
        let deposit_cents =
            parse_amount_cents(deposit_str).ok_or_else(|| EngineError::InputParse {
                row,
                column: "Deposit".into(),
                value: deposit_str.into(),
            })?;

        rows.push(UploadedRecord {
            row,
            name: record.get(cols.name).unwrap_or("").trim().to_string(),
            date,
            client_id: record.get(cols.client_id).unwrap_or("").trim().to_string(),
            deposit_cents,
        });
    }

    let shape = UploadShape {
        rows: rows.len(),
        cols: headers.len(),
    };
    Ok((shape, rows))
}

/// Load the reference ledger. Any malformed cell aborts before
/// reconciliation starts.
pub fn load_reference_table(csv_data: &str) -> Result<ReferenceTable, EngineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EngineError::ReferenceFetch(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let idx = |name: &str| -> Result<usize, EngineError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EngineError::ReferenceFetch(format!("missing column '{name}'")))
    };

    let account_idx = idx("accountId")?;
    let date_idx = idx("Date")?;
    let last_activity_idx = idx("last_activity")?;
    let activity_set_idx = idx("activity_set")?;
    let deposit_amount_idx = idx("deposit_amount")?;
    let distribution_idx = idx("deposit_distribution")?;

    let mut records = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| EngineError::ReferenceFetch(e.to_string()))?;

        let date_str = record.get(date_idx).unwrap_or("");
        let date = parse_date(date_str).ok_or_else(|| {
            EngineError::ReferenceFetch(format!("row {row}: cannot parse Date '{date_str}'"))
        })?;

        let last_activity_str = record.get(last_activity_idx).unwrap_or("").trim();
        let last_activity = if last_activity_str.is_empty() {
            None
        } else {
            Some(parse_date(last_activity_str).ok_or_else(|| {
                EngineError::ReferenceFetch(format!(
                    "row {row}: cannot parse last_activity '{last_activity_str}'"
                ))
            })?)
        };

        let amount_str = record.get(deposit_amount_idx).unwrap_or("").trim();
        let deposit_amount_cents = if amount_str.is_empty() {
            None
        } else {
            Some(parse_amount_cents(amount_str).ok_or_else(|| {
                EngineError::ReferenceFetch(format!(
                    "row {row}: cannot parse deposit_amount '{amount_str}'"
                ))
            })?)
        };

        records.push(ReferenceRecord {
            account_id: record.get(account_idx).unwrap_or("").trim().to_string(),
            date,
            last_activity,
            activity_set: record.get(activity_set_idx).unwrap_or("").trim().to_string(),
            deposit_amount_cents,
            deposit_distribution: record.get(distribution_idx).unwrap_or("").trim().to_string(),
        });
    }

    Ok(ReferenceTable::new(records))
}
