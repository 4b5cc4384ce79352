use serde::Deserialize;
use thiserror::Error;

/// Machine-readable error code reported by the job API.
///
/// Derived once at the transport boundary so that callers never have to
/// sniff free-text bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorCode {
    JobNotFound,
    TaskError,
    CouldNotBeDeleted,
    Other,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    code: Option<String>,
}

impl BackendErrorCode {
    /// Classify a response body. A recognized JSON `code` field wins;
    /// otherwise the known backend phrases are matched.
    pub fn from_body(body: &str) -> Self {
        if let Ok(ErrorEnvelope { code: Some(code) }) = serde_json::from_str(body) {
            let known = Self::from_code(&code);
            if known != Self::Other {
                return known;
            }
        }

        Self::from_phrases(body)
    }

    fn from_phrases(body: &str) -> Self {
        if body.contains("Job not found") {
            Self::JobNotFound
        } else if body.contains("could not be deleted") {
            Self::CouldNotBeDeleted
        } else if body.contains("Task error") {
            Self::TaskError
        } else {
            Self::Other
        }
    }

    fn from_code(code: &str) -> Self {
        match code.to_lowercase().as_str() {
            "job_not_found" | "not_found" => Self::JobNotFound,
            "task_error" => Self::TaskError,
            "could_not_be_deleted" => Self::CouldNotBeDeleted,
            _ => Self::Other,
        }
    }
}

/// Errors raised while talking to the job API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Status {
        status: u16,
        code: BackendErrorCode,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Client configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        ApiError::Status {
            status,
            code: BackendErrorCode::from_body(&body),
            body,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// True when the error means the job no longer exists on the remote side:
    /// a 404, an explicit "job not found" code, or a 500 raised because the
    /// backend task could not be deleted.
    pub fn is_gone_signature(&self) -> bool {
        match self {
            ApiError::Status { status: 404, .. } => true,
            ApiError::Status {
                code: BackendErrorCode::JobNotFound,
                ..
            } => true,
            ApiError::Status {
                status: 500,
                code: BackendErrorCode::TaskError | BackendErrorCode::CouldNotBeDeleted,
                ..
            } => true,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if let Some(status) = err.status() {
            ApiError::status(status.as_u16(), err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
