// src/error.rs

use thiserror::Error;

/// Failures the core can report. Short rows, bad cells and lookup misses
/// are not in here: those are tolerated, not raised.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The transport did not hand back a body.
    #[error("fetching {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The body arrived but is not UTF-8 text.
    #[error("feed body is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// The header line lacks a column we depend on. This means the upstream
    /// format changed, so the whole parse is rejected.
    #[error("CSV header is missing required column `{0}`")]
    MissingColumn(String),

    /// A record date that is not `yyyy-MM-dd`, or whose end of day cannot
    /// be represented.
    #[error("invalid record date {date:?}: {reason}")]
    InvalidDate { date: String, reason: String },

    /// The blocking parse task died before returning.
    #[error("parse task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl TrackerError {
    /// True for failures that reject a whole feed because of its shape
    /// rather than because it could not be retrieved.
    pub fn is_format_failure(&self) -> bool {
        matches!(self, TrackerError::MissingColumn(_))
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
