pub mod http_client;
pub mod job_accessor_impl;

pub use http_client::{ApiClient, ApiClientConfig};
pub use job_accessor_impl::JobAccessorImpl;
