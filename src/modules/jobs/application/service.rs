/// Lifecycle operations on a managed DBaaS job
///
/// Each operation submits the request and then blocks on the waiter until
/// the remote job settles.
use crate::modules::jobs::application::waiter::{JobWaiter, WaitRequest};
use crate::modules::jobs::domain::accessor::{JobAccessor, JobSubmitter};
use crate::modules::jobs::domain::entities::{DatabaseSnapshot, JobView};
use crate::modules::jobs::domain::value_objects::{JobIntent, JobMetadata};
use crate::modules::jobs::infrastructure::{ApiClient, JobAccessorImpl};
use crate::shared::errors::{ApiError, AppError, AppResult};
use crate::shared::utils::TimedOperation;
use crate::{log_error, log_info, log_warn};
use std::sync::Arc;

pub struct JobService {
    submitter: Arc<dyn JobSubmitter>,
    accessor: Arc<dyn JobAccessor>,
    waiter: JobWaiter,
}

impl JobService {
    pub fn new(submitter: Arc<dyn JobSubmitter>, accessor: Arc<dyn JobAccessor>) -> Self {
        let waiter = JobWaiter::new(accessor.clone());
        Self {
            submitter,
            accessor,
            waiter,
        }
    }

    /// Service backed by the HTTP job API
    pub fn from_client(client: Arc<ApiClient>) -> Self {
        let accessor = Arc::new(JobAccessorImpl::new(client));
        Self::new(accessor.clone(), accessor)
    }

    pub fn with_waiter(mut self, waiter: JobWaiter) -> Self {
        self.waiter = waiter;
        self
    }

    pub async fn create(
        &self,
        metadata: &JobMetadata,
        payload: &serde_json::Value,
    ) -> AppResult<Option<JobView>> {
        self.apply(JobIntent::Create, metadata, payload).await
    }

    pub async fn update(
        &self,
        metadata: &JobMetadata,
        payload: &serde_json::Value,
    ) -> AppResult<Option<JobView>> {
        self.apply(JobIntent::Update, metadata, payload).await
    }

    /// Delete the job. Deletion is idempotent: a job that is already gone,
    /// or a backend that cannot find the task to delete, counts as success.
    pub async fn delete(&self, metadata: &JobMetadata) -> AppResult<()> {
        metadata.validate()?;
        let timer = TimedOperation::new(&format!("delete job {}", metadata.name));

        match self
            .submitter
            .submit(JobIntent::Delete, metadata, None)
            .await
        {
            Ok(()) => {}
            Err(err) if tolerated_delete_error(&err) => {
                log_warn!(
                    "Ignoring error while deleting job '{}': {}",
                    metadata.name,
                    err
                );
            }
            Err(source) => {
                return Err(AppError::Submission {
                    action: JobIntent::Delete.to_string(),
                    name: metadata.name.clone(),
                    source,
                })
            }
        }

        let request = WaitRequest::new(metadata, JobIntent::Delete);
        match self.waiter.wait(&request).await {
            Ok(_) => {}
            Err(err) if err.transport_source().is_some_and(ApiError::is_gone_signature) => {
                log_info!("Job '{}' is already gone: {}", metadata.name, err);
            }
            Err(err) => return Err(err.into()),
        }

        timer.finish();
        Ok(())
    }

    /// Current resource view, `None` once the resource is gone
    pub async fn read(&self, metadata: &JobMetadata) -> AppResult<Option<JobView>> {
        Ok(self
            .accessor
            .read(&metadata.job_type, &metadata.affinity, &metadata.name)
            .await?)
    }

    /// Look up an existing database from its latest job, without waiting.
    ///
    /// Outputs include workers that only succeeded through a retry.
    pub async fn lookup(&self, metadata: &JobMetadata) -> AppResult<Option<DatabaseSnapshot>> {
        metadata.validate()?;

        match self.accessor.fetch(&metadata.job_type, &metadata.name).await {
            Ok(Some(job)) => Ok(Some(DatabaseSnapshot::from_job(
                &job,
                &metadata.job_type,
                &metadata.name,
            ))),
            Ok(None) => Ok(None),
            Err(err) if err.is_not_found() => Ok(None),
            Err(source) => {
                log_error!("Lookup of database '{}' failed: {}", metadata.name, source);
                Err(AppError::Lookup {
                    name: metadata.name.clone(),
                    source,
                })
            }
        }
    }

    async fn apply(
        &self,
        intent: JobIntent,
        metadata: &JobMetadata,
        payload: &serde_json::Value,
    ) -> AppResult<Option<JobView>> {
        metadata.validate()?;
        let timer = TimedOperation::new(&format!("{} job {}", intent, metadata.name));

        self.submitter
            .submit(intent, metadata, Some(payload))
            .await
            .map_err(|source| AppError::Submission {
                action: intent.to_string(),
                name: metadata.name.clone(),
                source,
            })?;

        let view = self
            .waiter
            .wait(&WaitRequest::new(metadata, intent))
            .await?;

        timer.finish();
        Ok(view)
    }
}

/// The job API answers a DELETE on a job it no longer tracks with either a
/// 404 or a 500.
fn tolerated_delete_error(err: &ApiError) -> bool {
    err.is_gone_signature() || err.status_code() == Some(500)
}
