/// Port for reaching a remote job
///
/// Implementations perform exactly one remote call per method: no retries,
/// no backoff. Resilience policy lives in the waiter.
use crate::modules::jobs::domain::entities::{Job, JobView};
use crate::modules::jobs::domain::value_objects::{JobIntent, JobMetadata};
use crate::shared::errors::ApiError;
use async_trait::async_trait;

#[async_trait]
pub trait JobAccessor: Send + Sync {
    /// Fetch the job's current representation.
    ///
    /// `Ok(None)` means the API answered without a job body.
    async fn fetch(&self, job_type: &str, name: &str) -> Result<Option<Job>, ApiError>;

    /// Instruct the remote system to re-attempt a failed job
    async fn retry(&self, job_type: &str, name: &str) -> Result<Option<Job>, ApiError>;

    /// Full resource read used once a job succeeded.
    ///
    /// `Ok(None)` means the resource no longer exists.
    async fn read(
        &self,
        job_type: &str,
        affinity: &str,
        name: &str,
    ) -> Result<Option<JobView>, ApiError>;
}

/// Port for submitting create/update/delete requests for a job
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    /// Submit the lifecycle request matching `intent`.
    ///
    /// `payload` is the resource configuration; it is ignored for deletions.
    async fn submit(
        &self,
        intent: JobIntent,
        metadata: &JobMetadata,
        payload: Option<&serde_json::Value>,
    ) -> Result<(), ApiError>;
}
