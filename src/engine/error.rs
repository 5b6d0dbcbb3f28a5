use reqwest::StatusCode;
use thiserror::Error;

/// Failures of a single engine REST call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{operation}: engine returned HTTP {status}: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("{operation}: request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: could not decode response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("no process definition registered for deployment {deployment_id}")]
    NoDefinition { deployment_id: String },
}

impl EngineError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            EngineError::UnexpectedStatus { status, .. } => Some(*status),
            EngineError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Transport { source, .. } if source.is_timeout())
    }
}
