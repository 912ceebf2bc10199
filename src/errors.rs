use crate::dataset::Coordinates;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Everything that can go wrong between reading an expression and producing
/// the favourable records.
#[derive(Debug, Error)]
pub enum PlanError {
    // Text did not match any grammar alternative, or only a prefix of it did
    #[error("syntax error in `{input}`: {message}")]
    Syntax { input: String, message: String },

    #[error("pop or peek on an empty predicate stack")]
    EmptyStack,

    #[error("no handler registered for predicate `{0}`")]
    UnknownPredicate(String),

    #[error("malformed `{keyword}` predicate: {message}")]
    MalformedPredicate { keyword: String, message: String },

    #[error("dataset was retrieved for {actual}, but the plan requires {expected}")]
    LocationMismatch {
        expected: Coordinates,
        actual: Coordinates,
    },

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // `origin` is the file path, or "input" for in-memory data
    #[error("failed to decode dataset JSON from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialise results: {0}")]
    Output(#[source] serde_json::Error),
}

impl PlanError {
    pub(crate) fn syntax(input: &str, message: impl Into<String>) -> Self {
        PlanError::Syntax {
            input: input.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn read(path: &Path, source: std::io::Error) -> Self {
        PlanError::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn decode(origin: impl Into<String>, source: serde_json::Error) -> Self {
        PlanError::Decode {
            origin: origin.into(),
            source,
        }
    }

    pub(crate) fn malformed(keyword: &str, message: impl Into<String>) -> Self {
        PlanError::MalformedPredicate {
            keyword: keyword.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanError>;
