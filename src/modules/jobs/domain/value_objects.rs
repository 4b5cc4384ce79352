/// Value objects for jobs domain
use crate::shared::errors::AppResult;
use crate::shared::utils::Validator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_JOB_TYPE: &str = "database-postgres";
pub const DEFAULT_AFFINITY: &str = "all";
pub const DEFAULT_WAIT_RETRY: Duration = Duration::from_secs(5);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(150);

/// Lifecycle phase the caller is waiting on
///
/// Deletion is idempotent: absence of the job counts as success and a job
/// still pending when the budget runs out is tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobIntent {
    Create,
    Update,
    Delete,
}

impl JobIntent {
    pub fn is_deletion(&self) -> bool {
        matches!(self, JobIntent::Delete)
    }

    /// State word used in user-facing messages
    pub fn expected_state(&self) -> &'static str {
        match self {
            JobIntent::Create => "created",
            JobIntent::Update => "updated",
            JobIntent::Delete => "deleted",
        }
    }
}

impl std::fmt::Display for JobIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobIntent::Create => write!(f, "create"),
            JobIntent::Update => write!(f, "update"),
            JobIntent::Delete => write!(f, "delete"),
        }
    }
}

/// Addressing and wait policy for one managed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub name: String,
    pub job_type: String,
    pub affinity: String,
    /// Ask the API to re-run the job when it reports `failed`
    pub retry: bool,
    /// Pause before asking for a retry
    pub wait_retry: Duration,
    /// Total budget for a whole wait
    pub timeout: Duration,
}

impl JobMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            job_type: DEFAULT_JOB_TYPE.to_string(),
            affinity: DEFAULT_AFFINITY.to_string(),
            retry: true,
            wait_retry: DEFAULT_WAIT_RETRY,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_type(mut self, job_type: impl Into<String>) -> Self {
        self.job_type = job_type.into();
        self
    }

    pub fn with_affinity(mut self, affinity: impl Into<String>) -> Self {
        self.affinity = affinity.into();
        self
    }

    pub fn with_retry(mut self, retry: bool, wait_retry: Duration) -> Self {
        self.retry = retry;
        self.wait_retry = wait_retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> AppResult<()> {
        Validator::validate_job_identifier("name", &self.name)?;
        Validator::validate_job_identifier("type", &self.job_type)?;
        Validator::validate_timeout(self.timeout)
    }

    /// Resource identifier `{type}/{affinity}/{name}`
    pub fn resource_id(&self) -> String {
        format!("{}/{}/{}", self.job_type, self.affinity, self.name)
    }
}
