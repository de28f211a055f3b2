//! Error types for decoding.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a decode.
///
/// Everything short of these (overruns, size mismatches, unresolved member
/// types) is reported through the diagnostics of the decode report.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unknown type: {0} is not a struct or union")]
    UnknownType(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;
