use crate::model::{ClassifiedRecord, JoinedRecord, Remark, Status};

/// Minimum elapsed days since the last prior activity for a deposit to
/// count as valid.
pub const DEFAULT_COOLDOWN_DAYS: i64 = 7;

/// Apply the cooldown rule to one joined record, in priority order:
///
/// 1. No exact-date reference entry (overall deposit absent) — the row is
///    `NoEntryFound` and the remark is cleared, overriding everything.
/// 2. No usable prior activity — status repeats the remark,
///    `NoPreviousDate`.
/// 3. Otherwise the day delta decides: at or past the cooldown is valid,
///    under it (negative deltas included) is invalid.
pub fn classify(joined: JoinedRecord, cooldown_days: i64) -> ClassifiedRecord {
    if joined.overall_deposit_cents.is_none() {
        return ClassifiedRecord {
            joined,
            status: Status::NoEntryFound,
            remark: Remark::None,
        };
    }

    let (status, remark) = match joined.previous_activity {
        None => (Status::NoPreviousDate, joined.remark),
        Some(prev) => {
            let delta_days = (joined.upload.date - prev).num_days();
            let status = if delta_days >= cooldown_days {
                Status::Valid
            } else {
                Status::Invalid
            };
            (status, joined.remark)
        }
    };

    ClassifiedRecord { joined, status, remark }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UploadedRecord;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn joined(
        up_date: &str,
        overall: Option<i64>,
        previous: Option<&str>,
        remark: Remark,
    ) -> JoinedRecord {
        JoinedRecord {
            upload: UploadedRecord {
                row: 0,
                name: "cre".into(),
                date: date(up_date),
                client_id: "5".into(),
                deposit_cents: 10_000,
            },
            overall_deposit_cents: overall,
            deposit_distribution: overall.map(|_| "even".into()),
            previous_activity: previous.map(date),
            previous_activity_set: previous.map(|_| "set".into()),
            remark,
        }
    }

    #[test]
    fn seven_days_is_valid() {
        let c = classify(
            joined("2024-01-12", Some(50_000), Some("2024-01-05"), Remark::None),
            DEFAULT_COOLDOWN_DAYS,
        );
        assert_eq!(c.status, Status::Valid);
        assert_eq!(c.remark, Remark::None);
    }

    #[test]
    fn under_seven_days_is_invalid() {
        let c = classify(
            joined("2024-01-09", Some(50_000), Some("2024-01-05"), Remark::None),
            DEFAULT_COOLDOWN_DAYS,
        );
        assert_eq!(c.status, Status::Invalid);
    }

    #[test]
    fn negative_delta_is_invalid() {
        // Prior activity recorded after the deposit date — data anomaly,
        // classified the same as a small positive delta.
        let c = classify(
            joined("2024-01-05", Some(50_000), Some("2024-01-09"), Remark::None),
            DEFAULT_COOLDOWN_DAYS,
        );
        assert_eq!(c.status, Status::Invalid);
    }

    #[test]
    fn no_previous_activity_repeats_remark() {
        let c = classify(
            joined("2024-01-12", Some(50_000), None, Remark::NoPreviousDate),
            DEFAULT_COOLDOWN_DAYS,
        );
        assert_eq!(c.status, Status::NoPreviousDate);
        assert_eq!(c.remark, Remark::NoPreviousDate);
    }

    #[test]
    fn missing_exact_entry_overrides_everything() {
        // Even with a perfectly valid prior activity, a missing exact-date
        // entry wins and the remark is cleared.
        let c = classify(
            joined("2024-01-12", None, Some("2024-01-01"), Remark::None),
            DEFAULT_COOLDOWN_DAYS,
        );
        assert_eq!(c.status, Status::NoEntryFound);
        assert_eq!(c.remark, Remark::None);

        let c = classify(
            joined("2024-01-12", None, None, Remark::NoPreviousDate),
            DEFAULT_COOLDOWN_DAYS,
        );
        assert_eq!(c.status, Status::NoEntryFound);
        assert_eq!(c.remark, Remark::None);
    }

    #[test]
    fn custom_cooldown_moves_the_boundary() {
        let j = joined("2024-01-12", Some(50_000), Some("2024-01-09"), Remark::None);
        assert_eq!(classify(j.clone(), 3).status, Status::Valid);
        assert_eq!(classify(j, 4).status, Status::Invalid);
    }
}
