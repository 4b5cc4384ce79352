pub mod api_error;
pub mod app_error;
pub mod wait_error;

pub use api_error::{ApiError, BackendErrorCode};
pub use app_error::{AppError, AppResult};
pub use wait_error::WaitError;
