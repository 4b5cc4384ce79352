// Shared kernel: error types and cross-cutting utilities

pub mod errors; // Shared error types
pub mod utils; // Logging and validation helpers

pub use errors::{ApiError, AppError, AppResult, WaitError};
