pub mod classifier;
pub mod failure_report;
pub mod report_renderer;

pub use classifier::{classify, Decision};
pub use failure_report::{FailureGroup, FailureReport};
pub use report_renderer::ReportRenderer;
