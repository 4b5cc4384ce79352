/// HTTP implementation of the job ports
///
/// Paths:
/// - `POST|PUT|DELETE /jobs/{type}/{name}` submit lifecycle requests
/// - `GET /jobs/{type}/{name}` reads the resource
/// - `GET /jobs/{type}/{name}/details` polls the job
/// - `POST /jobs/{type}/{name}/retry` re-attempts a failed job
use super::http_client::{job_path, ApiClient};
use crate::modules::jobs::domain::accessor::{JobAccessor, JobSubmitter};
use crate::modules::jobs::domain::entities::{Job, JobView};
use crate::modules::jobs::domain::value_objects::{JobIntent, JobMetadata};
use crate::shared::errors::ApiError;
use async_trait::async_trait;
use reqwest::Method;
use std::collections::HashMap;
use std::sync::Arc;

pub const AFFINITY_HEADER: &str = "Moldapi-Affinity";

pub struct JobAccessorImpl {
    client: Arc<ApiClient>,
}

impl JobAccessorImpl {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Check that a response carries a JSON document
    fn expect_json(&self, path: &str, body: &str) -> Result<serde_json::Value, ApiError> {
        serde_json::from_str(body).map_err(|_| {
            ApiError::InvalidResponse(format!(
                "Empty/Invalid json response from {}",
                self.client.url(path)
            ))
        })
    }
}

/// Decode a job body. A blank or `null` body means "no job".
pub fn decode_job(body: &str) -> Result<Option<Job>, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    serde_json::from_str::<Job>(trimmed)
        .map(Some)
        .map_err(|e| ApiError::InvalidResponse(format!("Cannot decode job: {}", e)))
}

#[async_trait]
impl JobAccessor for JobAccessorImpl {
    async fn fetch(&self, job_type: &str, name: &str) -> Result<Option<Job>, ApiError> {
        let path = job_path(job_type, name, Some("details"));
        let body = self
            .client
            .send(Method::GET, &path, None, &HashMap::new())
            .await?;
        decode_job(&body)
    }

    async fn retry(&self, job_type: &str, name: &str) -> Result<Option<Job>, ApiError> {
        let path = job_path(job_type, name, Some("retry"));
        let body = self
            .client
            .send(Method::POST, &path, None, &HashMap::new())
            .await?;
        decode_job(&body)
    }

    async fn read(
        &self,
        job_type: &str,
        affinity: &str,
        name: &str,
    ) -> Result<Option<JobView>, ApiError> {
        let path = job_path(job_type, name, None);
        let body = match self
            .client
            .send(Method::GET, &path, None, &HashMap::new())
            .await
        {
            Ok(body) => body,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        self.expect_json(&path, &body)?;

        match self.fetch(job_type, name).await {
            Ok(Some(job)) => Ok(Some(JobView::from_job(&job, job_type, affinity, name))),
            Ok(None) => Ok(None),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl JobSubmitter for JobAccessorImpl {
    async fn submit(
        &self,
        intent: JobIntent,
        metadata: &JobMetadata,
        payload: Option<&serde_json::Value>,
    ) -> Result<(), ApiError> {
        let path = job_path(&metadata.job_type, &metadata.name, None);
        let mut headers = HashMap::new();

        let (method, body) = match intent {
            JobIntent::Create => (Method::POST, Some(database_body(payload))),
            JobIntent::Update => {
                headers.insert(AFFINITY_HEADER.to_string(), metadata.affinity.clone());
                (Method::PUT, Some(database_body(payload)))
            }
            JobIntent::Delete => (Method::DELETE, None),
        };

        let response = self.client.send(method, &path, body, &headers).await?;
        if !intent.is_deletion() {
            self.expect_json(&path, &response)?;
        }
        Ok(())
    }
}

fn database_body(payload: Option<&serde_json::Value>) -> String {
    let database = payload.cloned().unwrap_or_else(|| serde_json::json!({}));
    serde_json::json!({ "database": database }).to_string()
}
