use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{DuplicateGroup, DuplicateReport, DuplicateTag, UploadedRecord};

/// Flag rows sharing a (client, date) key at calendar-date precision.
///
/// Every row in a group of size two or more is flagged — the first in
/// original upload order as `Original`, the rest as `DroppedDuplicate`.
/// The pair count divides flagged rows by two, which is exact only when
/// every group is a pair; larger groups undercount, and `groups` carries
/// the accurate breakdown.
pub fn detect_duplicates(rows: &[UploadedRecord]) -> DuplicateReport {
    let mut by_key: BTreeMap<(String, NaiveDate), Vec<usize>> = BTreeMap::new();
    for rec in rows {
        by_key
            .entry((rec.client_id.clone(), rec.date))
            .or_default()
            .push(rec.row);
    }

    let mut groups = Vec::new();
    let mut tags = BTreeMap::new();
    for ((client_id, date), members) in by_key {
        if members.len() < 2 {
            continue;
        }
        for (i, row) in members.iter().enumerate() {
            let tag = if i == 0 {
                DuplicateTag::Original
            } else {
                DuplicateTag::DroppedDuplicate
            };
            tags.insert(*row, tag);
        }
        groups.push(DuplicateGroup {
            client_id,
            date,
            rows: members,
        });
    }

    let pair_count = tags.len() / 2;

    DuplicateReport {
        groups,
        tags,
        pair_count,
    }
}
