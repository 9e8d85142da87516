//! Explicit pipeline state machine for one validation run.
//!
//! Replaces implicit rerun-on-confirmation flows: the caller drives the
//! session through explicit transitions, and an unresolved column
//! mapping is a pause (`AwaitingMapping`), not a failure.

use std::collections::BTreeMap;

use crate::config::ValidationConfig;
use crate::engine;
use crate::error::EngineError;
use crate::model::ValidationReport;
use crate::provider::ReferenceSource;
use crate::schema::resolve_columns;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    AwaitingMapping { missing: Vec<String> },
    Processing,
    Complete,
    Failed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingInput => write!(f, "awaiting_input"),
            Self::AwaitingMapping { .. } => write!(f, "awaiting_mapping"),
            Self::Processing => write!(f, "processing"),
            Self::Complete => write!(f, "complete"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

pub struct ValidationSession {
    config: ValidationConfig,
    state: SessionState,
    upload_csv: Option<String>,
    report: Option<ValidationReport>,
    error: Option<EngineError>,
}

impl ValidationSession {
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            config,
            state: SessionState::AwaitingInput,
            upload_csv: None,
            report: None,
            error: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    /// Accept the upload. Resolvable headers move the session to
    /// `Processing`; unresolved canonical columns pause it in
    /// `AwaitingMapping` with the missing display names.
    pub fn load_upload(&mut self, csv_data: &str) -> &SessionState {
        self.upload_csv = Some(csv_data.to_string());
        self.probe_headers();
        &self.state
    }

    /// Resolve a pending mapping: canonical key → source header. Merges
    /// into the config mapping and re-probes the stored upload.
    pub fn provide_mapping(
        &mut self,
        resolutions: BTreeMap<String, String>,
    ) -> Result<&SessionState, EngineError> {
        if !matches!(self.state, SessionState::AwaitingMapping { .. }) {
            return Err(EngineError::InvalidState(format!(
                "provide_mapping called in state '{}'",
                self.state
            )));
        }
        self.config.mapping.extend(resolutions);
        self.probe_headers();
        Ok(&self.state)
    }

    /// Fetch the reference ledger and run the reconciliation. A fetch or
    /// parse failure moves the session to `Failed` and is returned.
    pub fn process(
        &mut self,
        source: &dyn ReferenceSource,
    ) -> Result<&ValidationReport, EngineError> {
        if self.state != SessionState::Processing {
            return Err(EngineError::InvalidState(format!(
                "process called in state '{}'",
                self.state
            )));
        }
        let upload_csv = self.upload_csv.as_deref().unwrap_or_default();

        let reference = match source.fetch() {
            Ok(table) => table,
            Err(e) => {
                self.state = SessionState::Failed;
                self.error = Some(e.clone());
                return Err(e);
            }
        };

        match engine::run(&self.config, upload_csv, &reference) {
            Ok(report) => {
                self.state = SessionState::Complete;
                self.report = Some(report);
                Ok(self.report.as_ref().unwrap())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn probe_headers(&mut self) {
        let data = self.upload_csv.as_deref().unwrap_or_default();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data.as_bytes());
        let headers: Vec<String> = match reader.headers() {
            Ok(h) => h.iter().map(|s| s.to_string()).collect(),
            Err(e) => {
                self.state = SessionState::Failed;
                self.error = Some(EngineError::Io(e.to_string()));
                return;
            }
        };

        match resolve_columns(&headers, &self.config.mapping) {
            Ok(_) => self.state = SessionState::Processing,
            Err(EngineError::MappingRequired(missing)) => {
                self.state = SessionState::AwaitingMapping { missing };
            }
            Err(e) => {
                self.state = SessionState::Failed;
                self.error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::load_reference_table;
    use crate::joiner::ReferenceTable;
    use crate::model::Status;

    struct StaticSource(&'static str);

    impl ReferenceSource for StaticSource {
        fn fetch(&self) -> Result<ReferenceTable, EngineError> {
            load_reference_table(self.0)
        }
    }

    struct BrokenSource;

    impl ReferenceSource for BrokenSource {
        fn fetch(&self) -> Result<ReferenceTable, EngineError> {
            Err(EngineError::ReferenceFetch("unreachable".into()))
        }
    }

    const REFERENCE_CSV: &str = "\
accountId,Date,last_activity,activity_set,deposit_amount,deposit_distribution
5,2024-01-05,2024-01-05,poker,600.00,even
5,2024-01-12,2024-01-12,poker,600.00,even
";

    fn config() -> ValidationConfig {
        ValidationConfig::from_toml(
            r#"
name = "session test"
upload = "upload.csv"
reference = "reference.csv"
"#,
        )
        .unwrap()
    }

    #[test]
    fn clean_upload_goes_straight_to_processing() {
        let mut session = ValidationSession::new(config());
        assert_eq!(*session.state(), SessionState::AwaitingInput);

        session.load_upload("Date,Name,Client ID,Deposit\n2024-01-12,Alice,5,250.00\n");
        assert_eq!(*session.state(), SessionState::Processing);

        let report = session.process(&StaticSource(REFERENCE_CSV)).unwrap();
        assert_eq!(report.rows[0].status, Status::Valid);
        assert_eq!(*session.state(), SessionState::Complete);
    }

    #[test]
    fn mapping_pause_and_resume() {
        let mut session = ValidationSession::new(config());
        session.load_upload("Date,Name,Customer,Deposit\n2024-01-12,Alice,5,250.00\n");

        match session.state() {
            SessionState::AwaitingMapping { missing } => {
                assert_eq!(missing, &vec!["Client ID".to_string()])
            }
            other => panic!("expected AwaitingMapping, got {other}"),
        }

        let resolutions = BTreeMap::from([("client id".to_string(), "Customer".to_string())]);
        let state = session.provide_mapping(resolutions).unwrap();
        assert_eq!(*state, SessionState::Processing);

        let report = session.process(&StaticSource(REFERENCE_CSV)).unwrap();
        assert_eq!(report.rows.len(), 1);
    }

    #[test]
    fn fetch_failure_fails_the_session() {
        let mut session = ValidationSession::new(config());
        session.load_upload("Date,Name,Client ID,Deposit\n2024-01-12,Alice,5,250.00\n");

        let err = session.process(&BrokenSource).unwrap_err();
        assert!(matches!(err, EngineError::ReferenceFetch(_)));
        assert_eq!(*session.state(), SessionState::Failed);
        assert!(session.error().is_some());
    }

    #[test]
    fn process_out_of_order_is_rejected() {
        let mut session = ValidationSession::new(config());
        let err = session.process(&StaticSource(REFERENCE_CSV)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
        // Misuse does not fail the session itself.
        assert_eq!(*session.state(), SessionState::AwaitingInput);
    }

    #[test]
    fn provide_mapping_without_pause_is_rejected() {
        let mut session = ValidationSession::new(config());
        session.load_upload("Date,Name,Client ID,Deposit\n");
        let err = session.provide_mapping(BTreeMap::new()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidState(_)));
    }
}
