pub mod modules;
pub mod shared;

pub use modules::jobs::{
    ApiClient, ApiClientConfig, Job, JobAccessor, JobAccessorImpl, JobIntent, JobMetadata,
    JobService, JobState, JobSubmitter, JobView, JobWaiter, PollPolicy, WaitRequest,
};
pub use shared::errors::{ApiError, AppError, AppResult, WaitError};
pub use shared::utils::init_logger;
