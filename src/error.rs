use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::catalog::LoadFailure;

#[derive(Debug, Error, Diagnostic)]
pub enum CalendarError {
    #[error("invalid group id: {0:?}")]
    InvalidGroupId(String),

    #[error("group not found in catalog: {0}")]
    GroupNotFound(String),

    #[error("catalog request failed: {0}")]
    CatalogHttp(String),

    #[error("catalog server returned status {status}: {message}")]
    CatalogStatus { status: u16, message: String },

    #[error("failed to read catalog file at {0}")]
    CatalogRead(PathBuf),

    #[error("malformed catalog: {0}")]
    #[diagnostic(help("expected an object of category -> [[name, id], ...]"))]
    CatalogParse(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("telemetry request failed: {0}")]
    Telemetry(String),

    #[error("no group selected")]
    NothingSelected,
}

impl CalendarError {
    /// Classifies catalog loader errors; `None` for everything else.
    pub fn load_failure(&self) -> Option<LoadFailure> {
        match self {
            CalendarError::CatalogHttp(_)
            | CalendarError::CatalogStatus { .. }
            | CalendarError::CatalogRead(_) => Some(LoadFailure::Fetch),
            CalendarError::CatalogParse(_) => Some(LoadFailure::Parse),
            _ => None,
        }
    }
}
