use std::path::PathBuf;

use thiserror::Error;

/// A decision policy could not produce a decision.
#[derive(Debug, Error)]
#[error("{kind} policy failed: {reason}")]
pub struct PolicyError {
    pub kind: &'static str,
    pub reason: String,
}

impl PolicyError {
    pub fn new(kind: &'static str, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encode report: {0}")]
    ReportEncode(#[from] serde_json::Error),
}
