use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::Endpoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The backend answered with the error sentinel.
    Application,
    /// The request never produced a successful response.
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendError {
    #[error("backend reported an error for {endpoint}")]
    Application { endpoint: Endpoint },
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: Endpoint, message: String },
}

impl BackendError {
    pub fn transport(endpoint: Endpoint, message: impl Into<String>) -> Self {
        Self::Transport {
            endpoint,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Application { .. } => ErrorKind::Application,
            BackendError::Transport { .. } => ErrorKind::Transport,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            BackendError::Application { endpoint } | BackendError::Transport { endpoint, .. } => {
                *endpoint
            }
        }
    }
}
