pub mod accessor;
pub mod entities;
pub mod services;
pub mod value_objects;

pub use accessor::{JobAccessor, JobSubmitter};
pub use entities::{DatabaseSnapshot, Job, JobOutput, JobState, JobView, WorkerResult};
pub use value_objects::{JobIntent, JobMetadata};
