/// Test data factories using builder pattern
///
/// Provides convenient methods to create jobs and worker results with
/// sensible defaults
use dbaas_jobs::modules::jobs::domain::{Job, JobState, WorkerResult};

pub const TEST_JOB_TYPE: &str = "database-postgres";
pub const TEST_TASK_ID: &str = "c1c6ef46-86c4-4443-a60a-94c6b7abadd5";

pub struct WorkerFactory {
    worker: String,
    state: JobState,
    data: String,
    logs: String,
    retries: Vec<WorkerResult>,
}

impl WorkerFactory {
    pub fn new(worker: &str) -> Self {
        Self {
            worker: worker.to_string(),
            state: JobState::Finished,
            data: String::new(),
            logs: String::new(),
            retries: Vec::new(),
        }
    }

    pub fn finished(mut self, data: &str) -> Self {
        self.state = JobState::Finished;
        self.data = data.to_string();
        self
    }

    pub fn failed(mut self, logs: &str) -> Self {
        self.state = JobState::Failed;
        self.logs = logs.to_string();
        self
    }

    pub fn retry(mut self, retry: WorkerResult) -> Self {
        self.retries.push(retry);
        self
    }

    pub fn build(self) -> WorkerResult {
        WorkerResult {
            worker: self.worker,
            state: self.state,
            data: self.data,
            logs: self.logs,
            end_time: None,
            retries: self.retries,
        }
    }
}

pub struct JobFactory {
    name: String,
    job_type: String,
    state: JobState,
    tenant: String,
    output: Vec<WorkerResult>,
}

impl Default for JobFactory {
    fn default() -> Self {
        Self {
            name: "db1".to_string(),
            job_type: TEST_JOB_TYPE.to_string(),
            state: JobState::Pending,
            tenant: "tenant-a".to_string(),
            output: Vec::new(),
        }
    }
}

impl JobFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn state(mut self, state: JobState) -> Self {
        self.state = state;
        self
    }

    pub fn worker(mut self, worker: WorkerResult) -> Self {
        self.output.push(worker);
        self
    }

    pub fn build(self) -> Job {
        Job {
            name: self.name,
            state: self.state,
            task_id: TEST_TASK_ID.to_string(),
            user: "tester".to_string(),
            tenant: self.tenant,
            job_type: self.job_type,
            output: self.output,
            ..Default::default()
        }
    }

    /// JSON body as served by the job API
    pub fn build_json(self) -> String {
        serde_json::to_string(&self.build()).expect("job serializes")
    }
}

pub fn pending_job() -> Job {
    JobFactory::new().state(JobState::Pending).build()
}

pub fn finished_job() -> Job {
    JobFactory::new()
        .state(JobState::Finished)
        .worker(WorkerFactory::new("pg-1").finished("processed!").build())
        .build()
}

pub fn failed_job() -> Job {
    JobFactory::new()
        .state(JobState::Failed)
        .worker(WorkerFactory::new("pg-1").failed("Logs: step 1 Error: disk full").build())
        .worker(WorkerFactory::new("pg-2").failed("Logs: step 1 Error: disk full").build())
        .build()
}
