//! Canonical upload schema and column resolution.

use std::collections::BTreeMap;

use crate::error::EngineError;

/// Required columns: normalized lookup key → canonical display name.
/// Raw headers are matched against the keys after trimming and lower-casing.
pub const REQUIRED_COLUMNS: [(&str, &str); 4] = [
    ("date", "Date"),
    ("name", "Name"),
    ("client id", "Client ID"),
    ("deposit", "Deposit"),
];

/// Trim whitespace and lower-case a raw header.
pub fn clean_header(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// True when `key` is one of the canonical lookup keys.
pub fn is_canonical_key(key: &str) -> bool {
    REQUIRED_COLUMNS.iter().any(|(k, _)| *k == key)
}

/// Header indices of the four canonical columns in one upload.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedColumns {
    pub date: usize,
    pub name: usize,
    pub client_id: usize,
    pub deposit: usize,
}

/// Resolve raw upload headers against the canonical schema.
///
/// `mapping` supplies explicit resolutions for headers the cleaned match
/// does not find: canonical key → source header (matched cleaned). Two
/// canonical columns may resolve to the same source column; the data is
/// then ambiguous downstream, which is accepted by construction.
///
/// Returns `MappingRequired` with the canonical display names still
/// unresolved — the run pauses until the caller supplies them.
pub fn resolve_columns(
    headers: &[String],
    mapping: &BTreeMap<String, String>,
) -> Result<ResolvedColumns, EngineError> {
    let cleaned: Vec<String> = headers.iter().map(|h| clean_header(h)).collect();

    let position = |key: &str| -> Option<usize> {
        if let Some(pos) = cleaned.iter().position(|c| c == key) {
            return Some(pos);
        }
        let source = mapping.get(key)?;
        let source = clean_header(source);
        cleaned.iter().position(|c| *c == source)
    };

    let mut resolved: BTreeMap<&str, usize> = BTreeMap::new();
    let mut missing: Vec<String> = Vec::new();
    for (key, display) in REQUIRED_COLUMNS {
        match position(key) {
            Some(pos) => {
                resolved.insert(key, pos);
            }
            None => missing.push(display.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(EngineError::MappingRequired(missing));
    }

    Ok(ResolvedColumns {
        date: resolved["date"],
        name: resolved["name"],
        client_id: resolved["client id"],
        deposit: resolved["deposit"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_headers_resolve() {
        let h = headers(&["Date", "Name", "Client ID", "Deposit"]);
        let r = resolve_columns(&h, &BTreeMap::new()).unwrap();
        assert_eq!(r.date, 0);
        assert_eq!(r.name, 1);
        assert_eq!(r.client_id, 2);
        assert_eq!(r.deposit, 3);
    }

    #[test]
    fn cleaning_is_case_and_whitespace_insensitive() {
        let h = headers(&["  DATE ", "name", "Client id", " DEPOSIT"]);
        assert!(resolve_columns(&h, &BTreeMap::new()).is_ok());
    }

    #[test]
    fn missing_columns_pause_with_display_names() {
        let h = headers(&["Date", "Name", "Customer Number", "Amount"]);
        let err = resolve_columns(&h, &BTreeMap::new()).unwrap_err();
        match err {
            EngineError::MappingRequired(missing) => {
                assert_eq!(missing, vec!["Client ID".to_string(), "Deposit".to_string()]);
            }
            other => panic!("expected MappingRequired, got {other}"),
        }
    }

    #[test]
    fn mapping_resolves_missing_columns() {
        let h = headers(&["Date", "Name", "Customer Number", "Amount"]);
        let mapping = BTreeMap::from([
            ("client id".to_string(), "Customer Number".to_string()),
            ("deposit".to_string(), "amount".to_string()),
        ]);
        let r = resolve_columns(&h, &mapping).unwrap();
        assert_eq!(r.client_id, 2);
        assert_eq!(r.deposit, 3);
    }

    #[test]
    fn duplicate_target_assignment_is_accepted() {
        let h = headers(&["Date", "Name", "Client ID"]);
        let mapping = BTreeMap::from([("deposit".to_string(), "client id".to_string())]);
        let r = resolve_columns(&h, &mapping).unwrap();
        assert_eq!(r.deposit, r.client_id);
    }

    #[test]
    fn mapping_to_unknown_source_stays_missing() {
        let h = headers(&["Date", "Name", "Client ID"]);
        let mapping = BTreeMap::from([("deposit".to_string(), "no such column".to_string())]);
        let err = resolve_columns(&h, &mapping).unwrap_err();
        match err {
            EngineError::MappingRequired(missing) => assert_eq!(missing, vec!["Deposit"]),
            other => panic!("expected MappingRequired, got {other}"),
        }
    }
}
