//! Renders failure reports as the "task details" block attached to errors.

use super::failure_report::FailureReport;
use crate::modules::jobs::domain::entities::Job;
use crate::shared::errors::{AppError, AppResult};

pub const TASK_DETAILS_PREFIX: &str = ". Task details:\n\n";

pub struct ReportRenderer;

impl ReportRenderer {
    /// YAML block with stable field order: name, state, taskid, type,
    /// errors, then retries when any.
    pub fn render(report: &FailureReport) -> String {
        match serde_yml::to_string(report) {
            Ok(yaml) => format!("{}{}", TASK_DETAILS_PREFIX, yaml),
            Err(e) => format!(
                "Unable to yaml marshal: {}\n\nJob error is: {:?}",
                e, report
            ),
        }
    }

    pub fn render_job(job: &Job) -> String {
        Self::render(&FailureReport::from_job(job))
    }

    /// Parse a block produced by [`ReportRenderer::render`] back into a report.
    pub fn parse(rendered: &str) -> AppResult<FailureReport> {
        let start = rendered.find(TASK_DETAILS_PREFIX).ok_or_else(|| {
            AppError::InvalidInput("Rendered report has no task details block".to_string())
        })?;
        let yaml = &rendered[start + TASK_DETAILS_PREFIX.len()..];
        Ok(serde_yml::from_str(yaml)?)
    }
}
