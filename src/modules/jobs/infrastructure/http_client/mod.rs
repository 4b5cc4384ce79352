pub mod api_client;
pub mod client_config;

pub use api_client::{job_path, ApiClient};
pub use client_config::{ApiClientConfig, DEFAULT_REQUEST_TIMEOUT};
