//! Error taxonomy for snapshot collection

use std::io;
use thiserror::Error;

/// Errors raised while collecting a hardware snapshot
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: no output snapshot supplied")]
    InvalidArgument,

    #[error("Memory query failed: {0}")]
    MemoryQueryFailed(#[source] io::Error),

    #[error("Diagnostic source unavailable: {origin}")]
    DiagnosticSourceUnavailable {
        origin: String,
        #[source]
        source: io::Error,
    },

    #[error("No CPU frequency entry found in {origin}")]
    FrequencyUnavailable { origin: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn source_unavailable(origin: impl Into<String>, source: io::Error) -> Self {
        Error::DiagnosticSourceUnavailable {
            origin: origin.into(),
            source,
        }
    }

    pub(crate) fn frequency_unavailable(origin: impl Into<String>) -> Self {
        Error::FrequencyUnavailable {
            origin: origin.into(),
        }
    }
}
