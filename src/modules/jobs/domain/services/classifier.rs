//! Job state classification
//!
//! Maps one poll result to the waiter's next move. Deletion is idempotent:
//! a vanished job is success under deletion intent and a hard failure for
//! every other lifecycle phase.

use crate::modules::jobs::domain::entities::{Job, JobState};
use crate::modules::jobs::domain::value_objects::JobIntent;
use crate::shared::errors::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Job finished, or reached `deleted`/`dead` while deleting
    Succeeded,
    /// Non-terminal or unrecognized state
    StillRunning,
    /// `pending` while deleting; tolerated once the budget runs out
    PendingDuringDeletion,
    /// `failed` and the caller asked for remote retries
    FailedRetryable,
    /// `failed` without retries, or `dead` outside deletion
    FailedTerminal,
    /// Job is gone while deleting
    VanishedDuringDeletion,
    /// Any other fetch error, or no job body outside deletion
    FetchFailed,
}

pub fn classify(
    fetched: &Result<Option<Job>, ApiError>,
    intent: JobIntent,
    retry_enabled: bool,
) -> Decision {
    let deleting = intent.is_deletion();

    let job = match fetched {
        Err(err) if deleting && err.is_gone_signature() => {
            return Decision::VanishedDuringDeletion
        }
        Err(_) => return Decision::FetchFailed,
        Ok(None) if deleting => return Decision::VanishedDuringDeletion,
        Ok(None) => return Decision::FetchFailed,
        Ok(Some(job)) => job,
    };

    classify_state(&job.state, deleting, retry_enabled)
}

fn classify_state(state: &JobState, deleting: bool, retry_enabled: bool) -> Decision {
    match state {
        JobState::Finished => Decision::Succeeded,
        JobState::Deleted | JobState::Dead if deleting => Decision::Succeeded,
        JobState::Pending if deleting => Decision::PendingDuringDeletion,
        JobState::Failed if retry_enabled => Decision::FailedRetryable,
        JobState::Failed | JobState::Dead => Decision::FailedTerminal,
        JobState::Pending | JobState::Deleted | JobState::Unknown(_) => Decision::StillRunning,
    }
}
