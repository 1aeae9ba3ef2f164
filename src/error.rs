//! Failure modes of a tracking run

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    /// The product page could not be fetched.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A pre-rendered page could not be read from disk.
    #[error("failed to read rendered page {}: {source}", path.display())]
    PageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One of the product row groups is absent from the page.
    #[error("row group #{id} not found on page")]
    MissingRowGroup { id: String },

    /// A row or cell selector failed to parse.
    #[error("invalid selector '{css}': {message}")]
    Selector { css: String, message: String },

    /// The newest snapshot exists but is not a readable product workbook.
    #[error("cannot decode snapshot {}: {message}", path.display())]
    SnapshotDecode { path: PathBuf, message: String },

    #[error("cannot prepare output directory {}: {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write report {}: {message}", path.display())]
    OutputWrite { path: PathBuf, message: String },
}

/// Coarse classification used when reporting a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Extraction,
    SnapshotDecode,
    OutputWrite,
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::Fetch { .. }
            | TrackerError::PageRead { .. }
            | TrackerError::MissingRowGroup { .. }
            | TrackerError::Selector { .. } => ErrorKind::Extraction,
            TrackerError::SnapshotDecode { .. } => ErrorKind::SnapshotDecode,
            TrackerError::OutputDirectory { .. } | TrackerError::OutputWrite { .. } => {
                ErrorKind::OutputWrite
            }
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        TrackerError::SnapshotDecode {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        TrackerError::OutputWrite {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
