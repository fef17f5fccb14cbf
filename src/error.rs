use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    PathSyntax,
    PathTooComplex,
    DepthExceeded,
    IndexTooLarge,
    PathConflict,
    WorkerTransport,
    Worker,
    Timeout,
    Deserialize,
}

impl ErrorKind {
    /// Field-level errors are recorded and skipped; everything else fails the call.
    pub fn is_field_level(self) -> bool {
        matches!(
            self,
            ErrorKind::PathSyntax
                | ErrorKind::PathTooComplex
                | ErrorKind::DepthExceeded
                | ErrorKind::IndexTooLarge
                | ErrorKind::PathConflict
        )
    }

    pub fn stage(self) -> ErrorStage {
        match self {
            ErrorKind::PathSyntax | ErrorKind::PathTooComplex => ErrorStage::Parse,
            ErrorKind::DepthExceeded
            | ErrorKind::IndexTooLarge
            | ErrorKind::PathConflict
            | ErrorKind::Deserialize => ErrorStage::Build,
            ErrorKind::WorkerTransport | ErrorKind::Worker | ErrorKind::Timeout => {
                ErrorStage::Dispatch
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStage {
    Parse,
    Build,
    Dispatch,
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub stage: ErrorStage,
    pub message: String,
    pub key: Option<String>,
}

impl Error {
    fn new(kind: ErrorKind, stage: ErrorStage, message: impl Into<String>) -> Self {
        Self {
            kind,
            stage,
            message: message.into(),
            key: None,
        }
    }

    pub fn path_syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathSyntax, ErrorStage::Parse, message)
    }

    pub fn invalid_index(raw: &str) -> Self {
        Self::path_syntax(format!("invalid array index: {raw:?}"))
    }

    pub fn path_too_complex(steps: usize) -> Self {
        Self::new(
            ErrorKind::PathTooComplex,
            ErrorStage::Parse,
            format!("path too complex: more than {steps} parse steps"),
        )
    }

    pub fn depth_exceeded(depth: usize, max: usize) -> Self {
        Self::new(
            ErrorKind::DepthExceeded,
            ErrorStage::Build,
            format!("path depth {depth} exceeds maximum of {max}"),
        )
    }

    pub fn index_too_large(index: &str, max: usize) -> Self {
        Self::new(
            ErrorKind::IndexTooLarge,
            ErrorStage::Build,
            format!("array index {index} exceeds maximum of {max}"),
        )
    }

    pub fn path_conflict(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::PathConflict,
            ErrorStage::Build,
            format!("path conflict: {}", message.into()),
        )
    }

    pub fn worker_transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::WorkerTransport, ErrorStage::Dispatch, message)
    }

    pub fn worker(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Worker, ErrorStage::Dispatch, message)
    }

    pub fn timeout(millis: u64) -> Self {
        Self::new(
            ErrorKind::Timeout,
            ErrorStage::Dispatch,
            format!("serialization timed out after {millis} ms"),
        )
    }

    pub fn deserialize(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Deserialize, ErrorStage::Build, message)
    }

    /// Rebuild an error reported by a worker as `kind` and `message`.
    pub fn reported(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, kind.stage(), message)
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}
