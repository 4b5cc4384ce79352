pub mod poll_policy;
pub mod service;
pub mod waiter;

pub use poll_policy::PollPolicy;
pub use service::JobService;
pub use waiter::{JobWaiter, WaitRequest};
