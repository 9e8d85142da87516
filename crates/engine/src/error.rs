use std::fmt;

#[derive(Debug, Clone)]
pub enum EngineError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad cooldown, unknown mapping key, etc.).
    ConfigValidation(String),
    /// Required canonical columns could not be resolved from the upload
    /// headers. Carries the canonical display names still missing.
    /// Not a terminal failure — the run resumes once a mapping is supplied.
    MappingRequired(Vec<String>),
    /// A cell in the upload could not be parsed. Fatal to the run.
    InputParse { row: usize, column: String, value: String },
    /// Reference dataset unreachable or malformed. Fatal, aborts before
    /// any reconciliation work.
    ReferenceFetch(String),
    /// IO error (file read, export write).
    Io(String),
    /// A session method was called in a state that does not accept it.
    InvalidState(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MappingRequired(missing) => {
                write!(f, "column mapping required for: {}", missing.join(", "))
            }
            Self::InputParse { row, column, value } => {
                write!(f, "upload row {row}, column '{column}': cannot parse '{value}'")
            }
            Self::ReferenceFetch(msg) => write!(f, "reference fetch error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::InvalidState(msg) => write!(f, "invalid session state: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    /// Mapping resolution pauses the run; everything else kills it.
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::MappingRequired(_))
    }
}
