//! Output projection, summary statistics, delimited export.

use std::collections::BTreeMap;
use std::io::Write;

use crate::error::EngineError;
use crate::model::{
    ClassifiedRecord, DuplicateReport, OutputRecord, UploadShape, ValidationSummary,
};
use crate::money::format_cents;

/// Export header row, in order.
pub const OUTPUT_HEADERS: [&str; 9] = [
    "CRE",
    "Date",
    "Client ID",
    "1st_deposit_provided",
    "remaining_deposit",
    "overall_deposit_amount",
    "previous_activity",
    "remark",
    "status",
];

/// Project classified records into the final output schema.
/// Remaining deposit is overall minus first, absent when the exact-date
/// entry was missing.
pub fn assemble(classified: Vec<ClassifiedRecord>) -> Vec<OutputRecord> {
    classified
        .into_iter()
        .map(|c| {
            let first = c.joined.upload.deposit_cents;
            let overall = c.joined.overall_deposit_cents;
            OutputRecord {
                cre: c.joined.upload.name,
                date: c.joined.upload.date,
                client_id: c.joined.upload.client_id,
                first_deposit_cents: first,
                remaining_deposit_cents: overall.map(|o| o - first),
                overall_deposit_cents: overall,
                previous_activity: c.joined.previous_activity,
                remark: c.remark,
                status: c.status,
            }
        })
        .collect()
}

/// Shape, duplicate pairs, and the status frequency table.
pub fn summarize(
    shape: UploadShape,
    duplicates: &DuplicateReport,
    rows: &[OutputRecord],
) -> ValidationSummary {
    let mut status_counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        *status_counts.entry(row.status.to_string()).or_insert(0) += 1;
    }
    ValidationSummary {
        shape,
        duplicate_pairs: duplicates.pair_count,
        status_counts,
    }
}

/// Write output rows as delimited text. Absent values export as empty
/// fields; amounts as two-decimal strings; dates as YYYY-MM-DD.
pub fn write_csv<W: Write>(rows: &[OutputRecord], writer: W) -> Result<(), EngineError> {
    let mut w = csv::Writer::from_writer(writer);
    w.write_record(OUTPUT_HEADERS)
        .map_err(|e| EngineError::Io(e.to_string()))?;
    for row in rows {
        let record = [
            row.cre.clone(),
            row.date.to_string(),
            row.client_id.clone(),
            format_cents(row.first_deposit_cents),
            row.remaining_deposit_cents.map(format_cents).unwrap_or_default(),
            row.overall_deposit_cents.map(format_cents).unwrap_or_default(),
            row.previous_activity.map(|d| d.to_string()).unwrap_or_default(),
            row.remark.to_string(),
            row.status.to_string(),
        ];
        w.write_record(&record)
            .map_err(|e| EngineError::Io(e.to_string()))?;
    }
    w.flush().map_err(|e| EngineError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JoinedRecord, Remark, Status, UploadedRecord};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn classified(overall: Option<i64>, status: Status) -> ClassifiedRecord {
        ClassifiedRecord {
            joined: JoinedRecord {
                upload: UploadedRecord {
                    row: 0,
                    name: "Alice".into(),
                    date: date("2024-01-12"),
                    client_id: "1001".into(),
                    deposit_cents: 25_000,
                },
                overall_deposit_cents: overall,
                deposit_distribution: None,
                previous_activity: Some(date("2024-01-05")),
                previous_activity_set: None,
                remark: Remark::None,
            },
            status,
            remark: Remark::None,
        }
    }

    #[test]
    fn remaining_is_overall_minus_first() {
        let rows = assemble(vec![classified(Some(60_000), Status::Valid)]);
        assert_eq!(rows[0].remaining_deposit_cents, Some(35_000));
        assert_eq!(rows[0].overall_deposit_cents, Some(60_000));
    }

    #[test]
    fn remaining_absent_without_overall() {
        let rows = assemble(vec![classified(None, Status::NoEntryFound)]);
        assert!(rows[0].remaining_deposit_cents.is_none());
    }

    #[test]
    fn status_counts_accumulate() {
        let rows = assemble(vec![
            classified(Some(60_000), Status::Valid),
            classified(Some(60_000), Status::Valid),
            classified(None, Status::NoEntryFound),
        ]);
        let dup = DuplicateReport {
            groups: vec![],
            tags: Default::default(),
            pair_count: 0,
        };
        let summary = summarize(UploadShape { rows: 3, cols: 4 }, &dup, &rows);
        assert_eq!(summary.status_counts["valid"], 2);
        assert_eq!(summary.status_counts["No entry found for this trx"], 1);
        assert_eq!(summary.shape.rows, 3);
    }

    #[test]
    fn csv_export_shapes_fields() {
        let rows = assemble(vec![classified(Some(60_000), Status::Valid)]);
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "CRE,Date,Client ID,1st_deposit_provided,remaining_deposit,overall_deposit_amount,previous_activity,remark,status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Alice,2024-01-12,1001,250.00,350.00,600.00,2024-01-05,,valid"
        );
    }
}
