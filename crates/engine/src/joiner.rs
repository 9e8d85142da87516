//! Reference table index and the temporal join.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::{JoinedRecord, ReferenceRecord, Remark, UploadedRecord};

/// The reference ledger plus a per-account lookup index.
///
/// Each account's record positions are sorted by (date, input position),
/// so predecessor lookups are a binary search instead of a scan over the
/// whole ledger.
#[derive(Debug, Clone)]
pub struct ReferenceTable {
    records: Vec<ReferenceRecord>,
    by_account: HashMap<String, Vec<usize>>,
}

impl ReferenceTable {
    pub fn new(records: Vec<ReferenceRecord>) -> Self {
        let mut by_account: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, rec) in records.iter().enumerate() {
            by_account.entry(rec.account_id.clone()).or_default().push(i);
        }
        for positions in by_account.values_mut() {
            positions.sort_by_key(|&i| (records[i].date, i));
        }
        Self { records, by_account }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    /// Exact (account, date) match. Several records on the same key
    /// resolve to the first in input order.
    pub fn exact(&self, account_id: &str, date: NaiveDate) -> Option<&ReferenceRecord> {
        let positions = self.by_account.get(account_id)?;
        let start = positions.partition_point(|&i| self.records[i].date < date);
        let &i = positions.get(start)?;
        if self.records[i].date == date {
            Some(&self.records[i])
        } else {
            None
        }
    }

    /// Closest record for the account strictly before `date`. Ties on the
    /// maximal prior date resolve to the last in input order.
    pub fn previous(&self, account_id: &str, date: NaiveDate) -> Option<&ReferenceRecord> {
        let positions = self.by_account.get(account_id)?;
        let before = positions.partition_point(|&i| self.records[i].date < date);
        if before == 0 {
            return None;
        }
        Some(&self.records[positions[before - 1]])
    }
}

/// Run both lookups for every upload row and merge the results.
/// The upload row is always kept; unmatched reference fields stay absent.
pub fn join_records(uploads: &[UploadedRecord], reference: &ReferenceTable) -> Vec<JoinedRecord> {
    uploads
        .iter()
        .map(|up| {
            let exact = reference.exact(&up.client_id, up.date);
            let previous = reference.previous(&up.client_id, up.date);

            let remark = if previous.is_none() {
                Remark::NoPreviousDate
            } else {
                Remark::None
            };

            JoinedRecord {
                upload: up.clone(),
                overall_deposit_cents: exact.and_then(|r| r.deposit_amount_cents),
                deposit_distribution: exact.map(|r| r.deposit_distribution.clone()),
                previous_activity: previous.and_then(|r| r.last_activity),
                previous_activity_set: previous.map(|r| r.activity_set.clone()),
                remark,
            }
        })
        .collect()
}
