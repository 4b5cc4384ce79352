use super::api_error::ApiError;
use std::time::Duration;
use thiserror::Error;

/// Terminal outcomes of a job wait that did not succeed.
///
/// `report` fields hold the rendered task details block and are appended
/// verbatim to the message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaitError {
    #[error("Error when getting job '{name}': {source}")]
    Transport {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Unexpected empty job returned for '{name}'")]
    EmptyJob { name: String },

    #[error("Expected job '{name}' to be {expected} but was in state {state}; details: {report}")]
    RemoteJobFailure {
        name: String,
        expected: String,
        state: String,
        report: String,
    },

    #[error("Expected job '{name}' to be {expected} but was in state {state}, and triggering a retry failed ({source}){report}")]
    RetryTriggerFailed {
        name: String,
        expected: String,
        state: String,
        #[source]
        source: ApiError,
        report: String,
    },

    #[error("Timed out after {timeout:?} waiting for job '{name}' (last state: {last_state}){report}")]
    TimeoutExceeded {
        name: String,
        timeout: Duration,
        last_state: String,
        report: String,
    },

    #[error("Unable to read back job '{name}': {source}")]
    ReadBack {
        name: String,
        #[source]
        source: ApiError,
    },

    #[error("Wait for job '{name}' was cancelled")]
    Cancelled { name: String },
}

impl WaitError {
    /// The wait gave up while the job was still in a non-terminal state.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimeoutExceeded { .. })
    }

    /// The remote job itself reported a failure.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            WaitError::RemoteJobFailure { .. } | WaitError::RetryTriggerFailed { .. }
        )
    }

    pub fn transport_source(&self) -> Option<&ApiError> {
        match self {
            WaitError::Transport { source, .. }
            | WaitError::RetryTriggerFailed { source, .. }
            | WaitError::ReadBack { source, .. } => Some(source),
            _ => None,
        }
    }
}
