use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimetableError {
    #[error("{0}")]
    BadParams(String),
    #[error("{kind} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("{0}")]
    InvalidState(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl TimetableError {
    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::BadParams(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Stable wire code for the IPC error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadParams(_) => "bad_params",
            Self::NotFound { .. } => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::Store(_) => "store_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::NotFound { kind, id } => Some(json!({ "kind": kind, "id": id })),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TimetableError>;
