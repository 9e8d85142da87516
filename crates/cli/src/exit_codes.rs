//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                        |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 1    | General error (unspecified)                    |
//! | 2    | CLI usage error (bad args, unreadable config)  |
//! | 3    | Column mapping required                        |
//! | 4    | Upload parse error                             |
//! | 5    | Reference fetch error                          |
//! | 6    | Invalid config                                 |

use depval_engine::EngineError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable config file.
pub const EXIT_USAGE: u8 = 2;

/// Required canonical columns unresolved. The run can resume once a
/// `[mapping]` table supplies them — not a data failure.
pub const EXIT_MAPPING_REQUIRED: u8 = 3;

/// Upload file unreadable or a cell failed to parse.
pub const EXIT_INPUT_PARSE: u8 = 4;

/// Reference dataset unreachable or malformed.
pub const EXIT_REFERENCE_FETCH: u8 = 5;

/// Config file parsed but failed validation.
pub const EXIT_CONFIG_INVALID: u8 = 6;

/// Map an engine error to its exit code.
pub fn engine_exit_code(err: &EngineError) -> u8 {
    match err {
        EngineError::MappingRequired(_) => EXIT_MAPPING_REQUIRED,
        EngineError::InputParse { .. } => EXIT_INPUT_PARSE,
        EngineError::ReferenceFetch(_) => EXIT_REFERENCE_FETCH,
        EngineError::ConfigParse(_) | EngineError::ConfigValidation(_) => EXIT_CONFIG_INVALID,
        EngineError::Io(_) => EXIT_USAGE,
        EngineError::InvalidState(_) => EXIT_ERROR,
    }
}
