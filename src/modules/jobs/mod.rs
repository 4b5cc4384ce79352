/// Remote DBaaS job module
///
/// Drives asynchronous jobs on the DBaaS job API to completion:
/// - Submitting create/update/delete requests for a database resource
/// - Polling the job until it settles, retrying failed jobs when allowed
/// - Summarizing worker failures into a readable report
///
/// Architecture:
/// - Domain: Entities, ports, classification and failure reporting
/// - Application: Poll policy, waiter and the lifecycle service
/// - Infrastructure: reqwest-based client implementing the ports
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-exports for easy access
pub use application::{JobService, JobWaiter, PollPolicy, WaitRequest};
pub use domain::{
    DatabaseSnapshot, Job, JobAccessor, JobIntent, JobMetadata, JobOutput, JobState, JobSubmitter, JobView,
    WorkerResult,
};
pub use infrastructure::{ApiClient, ApiClientConfig, JobAccessorImpl};
