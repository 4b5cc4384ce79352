/// Domain entities for remote DBaaS jobs
///
/// A job is addressed by `(type, name)` and is fetched fresh on every poll.
/// These types are read-only views over the job API's JSON representation.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Job state as reported by the job API
///
/// The vocabulary is open-ended: anything the client does not recognize is
/// kept as `Unknown` and treated as still pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    Pending,
    Finished,
    Failed,
    Dead,
    Deleted,
    Unknown(String),
}

impl JobState {
    pub fn as_str(&self) -> &str {
        match self {
            JobState::Pending => "pending",
            JobState::Finished => "finished",
            JobState::Failed => "failed",
            JobState::Dead => "dead",
            JobState::Deleted => "deleted",
            JobState::Unknown(raw) => raw,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, JobState::Finished)
    }
}

impl Default for JobState {
    fn default() -> Self {
        JobState::Unknown(String::new())
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for JobState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "pending" => JobState::Pending,
            "finished" => JobState::Finished,
            "failed" => JobState::Failed,
            "dead" => JobState::Dead,
            "deleted" => JobState::Deleted,
            other => JobState::Unknown(other.to_string()),
        })
    }
}

impl From<String> for JobState {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(state) => state,
            Err(never) => match never {},
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.as_str().to_string()
    }
}

/// One executor's result for (a portion of) a job
///
/// `retries` holds re-attempts of this worker. The API only nests one level
/// deep; deeper entries are kept but treated as opaque by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkerResult {
    #[serde(default)]
    pub worker: String,
    #[serde(default)]
    pub state: JobState,
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub logs: String,
    #[serde(
        default,
        rename = "endtime",
        deserialize_with = "lenient_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retries: Vec<WorkerResult>,
}

/// Job representation returned by `/jobs/{type}/{name}/details`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: JobState,
    #[serde(default, rename = "taskid")]
    pub task_id: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub tenant: String,
    #[serde(default, rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub current_data: serde_json::Value,
    #[serde(default)]
    pub desired_data: serde_json::Value,
    #[serde(
        default,
        rename = "begintime",
        deserialize_with = "lenient_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub begin_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename = "endtime",
        deserialize_with = "lenient_time",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output: Vec<WorkerResult>,
}

impl Job {
    /// Outputs of every worker that succeeded, either directly or through one
    /// of its retries.
    pub fn successful_outputs(&self) -> Vec<JobOutput> {
        let mut outputs = Vec::new();
        for worker in &self.output {
            if worker.state.is_finished() {
                outputs.push(JobOutput::from(worker));
                continue;
            }
            outputs.extend(
                worker
                    .retries
                    .iter()
                    .filter(|retry| retry.state.is_finished())
                    .map(JobOutput::from),
            );
        }
        outputs
    }

    /// Output of the first worker, when that worker finished.
    pub fn primary_output(&self) -> Option<JobOutput> {
        self.output
            .first()
            .filter(|worker| worker.state.is_finished())
            .map(JobOutput::from)
    }

    /// The current resource configuration, decoding it when the API sends it
    /// as a JSON-encoded string.
    pub fn current_data_json(&self) -> Option<serde_json::Value> {
        match &self.current_data {
            serde_json::Value::Null => None,
            serde_json::Value::String(raw) => serde_json::from_str(raw).ok(),
            other => Some(other.clone()),
        }
    }
}

/// `(worker, data)` pair exposed to callers once a job succeeded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOutput {
    pub worker: String,
    pub data: String,
}

impl From<&WorkerResult> for JobOutput {
    fn from(worker: &WorkerResult) -> Self {
        Self {
            worker: worker.worker.clone(),
            data: worker.data.clone(),
        }
    }
}

/// Local view of a resource read back after a job succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobView {
    /// `{type}/{affinity}/{name}`
    pub id: String,
    pub job_type: String,
    pub affinity: String,
    pub name: String,
    pub tenant: String,
    pub state: JobState,
    pub task_id: String,
    pub outputs: Vec<JobOutput>,
}

impl JobView {
    pub fn from_job(job: &Job, job_type: &str, affinity: &str, name: &str) -> Self {
        Self {
            id: format!("{}/{}/{}", job_type, affinity, name),
            job_type: job_type.to_string(),
            affinity: affinity.to_string(),
            name: name.to_string(),
            tenant: job.tenant.clone(),
            state: job.state.clone(),
            task_id: job.task_id.clone(),
            outputs: job.primary_output().into_iter().collect(),
        }
    }
}

/// Read-only view of an existing database, regardless of how it was provisioned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    /// `{type}/{name}`
    pub id: String,
    pub job_type: String,
    pub name: String,
    pub state: JobState,
    pub task_id: String,
    pub outputs: Vec<JobOutput>,
    /// Current configuration, when the job carries valid JSON for it
    pub database: Option<serde_json::Value>,
}

impl DatabaseSnapshot {
    pub fn from_job(job: &Job, job_type: &str, name: &str) -> Self {
        Self {
            id: format!("{}/{}", job_type, name),
            job_type: job_type.to_string(),
            name: name.to_string(),
            state: job.state.clone(),
            task_id: job.task_id.clone(),
            outputs: job.successful_outputs(),
            database: job.current_data_json(),
        }
    }
}

fn lenient_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| DateTime::parse_from_rfc3339(&value).ok().map(|t| t.with_timezone(&Utc))))
}
