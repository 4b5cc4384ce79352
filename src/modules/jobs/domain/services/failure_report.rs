//! Worker log aggregation
//!
//! Builds a deduplicated failure report from a job's multi-worker output.
//! Workers whose cleaned logs are identical are merged into one group, in
//! first-seen order. Top-level failures and worker retry failures are
//! grouped in separate tables and never merged with each other.

use crate::modules::jobs::domain::entities::{Job, WorkerResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

static LOGS_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^.*?(Logs: .*)$").expect("logs marker pattern is valid"));

static ESCAPED_NEWLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\\n").expect("escaped newline pattern is valid"));

/// Workers sharing one failure message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureGroup {
    pub workers: Vec<String>,
    pub message: String,
}

/// Structured, deduplicated explanation of a job that did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub name: String,
    pub state: String,
    #[serde(rename = "taskid")]
    pub task_id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub errors: Vec<FailureGroup>,
    #[serde(default, rename = "retries", skip_serializing_if = "Vec::is_empty")]
    pub retry_errors: Vec<FailureGroup>,
}

impl FailureReport {
    pub fn from_job(job: &Job) -> Self {
        let mut errors = GroupTable::default();
        let mut retry_errors = GroupTable::default();

        for worker in &job.output {
            if worker.state.is_finished() {
                continue;
            }

            // A successful retry supersedes both the worker's own failure and
            // every failed attempt recorded before it.
            if worker.retries.iter().any(|retry| retry.state.is_finished()) {
                continue;
            }

            // Entries nested below `retries` are opaque: only one level is read.
            for retry in &worker.retries {
                retry_errors.insert(retry);
            }

            errors.insert(worker);
        }

        Self {
            name: job.name.clone(),
            state: job.state.to_string(),
            task_id: job.task_id.clone(),
            job_type: job.job_type.clone(),
            errors: errors.into_groups(),
            retry_errors: retry_errors.into_groups(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.retry_errors.is_empty()
    }
}

/// Insertion-ordered groups keyed by cleaned message
#[derive(Default)]
struct GroupTable {
    index: HashMap<String, usize>,
    groups: Vec<FailureGroup>,
}

impl GroupTable {
    fn insert(&mut self, worker: &WorkerResult) {
        let message = clean_log(&worker.logs);

        match self.index.get(&message) {
            Some(&position) => {
                let group = &mut self.groups[position];
                if !group.workers.contains(&worker.worker) {
                    group.workers.push(worker.worker.clone());
                }
            }
            None => {
                self.index.insert(message.clone(), self.groups.len());
                self.groups.push(FailureGroup {
                    workers: vec![worker.worker.clone()],
                    message,
                });
            }
        }
    }

    fn into_groups(self) -> Vec<FailureGroup> {
        self.groups
    }
}

/// Strip the command echo preceding a `Logs: ...` marker, put each
/// `Error:` on its own line and turn escaped `\n` sequences into newlines.
pub fn clean_log(raw: &str) -> String {
    let trimmed = LOGS_MARKER.replace_all(raw, "${1}");
    let split = trimmed.replace(" Error:", "\nError:");
    ESCAPED_NEWLINE.replace_all(&split, "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::jobs::domain::entities::JobState;

    fn worker(id: &str, state: JobState, logs: &str) -> WorkerResult {
        WorkerResult {
            worker: id.to_string(),
            state,
            logs: logs.to_string(),
            ..Default::default()
        }
    }

    fn failed_job(output: Vec<WorkerResult>) -> Job {
        Job {
            name: "db1".into(),
            state: JobState::Failed,
            task_id: "task-1".into(),
            job_type: "database-postgres".into(),
            output,
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_logs_are_grouped_in_first_seen_order() {
        let job = failed_job(vec![
            worker("A", JobState::Failed, "disk full"),
            worker("C", JobState::Failed, "timeout"),
            worker("B", JobState::Failed, "disk full"),
        ]);

        let report = FailureReport::from_job(&job);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].workers, vec!["A", "B"]);
        assert_eq!(report.errors[0].message, "disk full");
        assert_eq!(report.errors[1].workers, vec!["C"]);
        assert!(report.retry_errors.is_empty());
    }

    #[test]
    fn test_finished_workers_are_skipped() {
        let job = failed_job(vec![
            worker("A", JobState::Finished, "ok"),
            worker("B", JobState::Dead, "crashed"),
        ]);

        let report = FailureReport::from_job(&job);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].workers, vec!["B"]);
    }

    #[test]
    fn test_repeated_worker_id_is_listed_once() {
        let job = failed_job(vec![
            worker("A", JobState::Failed, "boom"),
            worker("A", JobState::Failed, "boom"),
        ]);

        let report = FailureReport::from_job(&job);
        assert_eq!(report.errors[0].workers, vec!["A"]);
    }

    #[test]
    fn test_retry_success_suppresses_whole_history() {
        let mut flaky = worker("A", JobState::Failed, "first failure");
        flaky.retries = vec![
            worker("A", JobState::Failed, "second failure"),
            worker("A", JobState::Finished, "done"),
            worker("A", JobState::Failed, "late failure"),
        ];

        let mut broken = worker("B", JobState::Failed, "broken");
        broken.retries = vec![
            worker("B", JobState::Failed, "still broken"),
            worker("B", JobState::Failed, "still broken"),
        ];

        let report = FailureReport::from_job(&failed_job(vec![flaky, broken]));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].workers, vec!["B"]);
        assert_eq!(report.retry_errors.len(), 1);
        assert_eq!(report.retry_errors[0].workers, vec!["B"]);
        assert_eq!(report.retry_errors[0].message, "still broken");
    }

    #[test]
    fn test_errors_and_retries_are_not_merged() {
        let mut w = worker("A", JobState::Failed, "same text");
        w.retries = vec![worker("A", JobState::Failed, "same text")];

        let report = FailureReport::from_job(&failed_job(vec![w]));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.retry_errors.len(), 1);
    }

    #[test]
    fn test_deep_retry_nesting_is_treated_as_leaf() {
        let mut nested = worker("A", JobState::Failed, "level one");
        nested.retries = vec![worker("A", JobState::Finished, "level two")];

        let mut w = worker("A", JobState::Failed, "top");
        w.retries = vec![nested];

        let report = FailureReport::from_job(&failed_job(vec![w]));
        assert_eq!(report.retry_errors.len(), 1);
        assert_eq!(report.retry_errors[0].message, "level one");
    }

    #[test]
    fn test_messages_that_clean_identically_are_merged() {
        let job = failed_job(vec![
            worker("A", JobState::Failed, "ansible-playbook run.yml Logs: failed"),
            worker("B", JobState::Failed, "ansible-playbook other.yml Logs: failed"),
        ]);

        let report = FailureReport::from_job(&job);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].workers, vec!["A", "B"]);
        assert_eq!(report.errors[0].message, "Logs: failed");
    }

    #[test]
    fn test_clean_log_strips_command_prefix() {
        assert_eq!(
            clean_log("/usr/bin/run --db db1 Logs: creation failed"),
            "Logs: creation failed"
        );
        assert_eq!(clean_log("no marker here"), "no marker here");
    }

    #[test]
    fn test_clean_log_splits_errors_and_escaped_newlines() {
        assert_eq!(
            clean_log("Logs: step 1 Error: disk full"),
            "Logs: step 1\nError: disk full"
        );
        assert_eq!(clean_log(r"line one   \nline two"), "line one\nline two");
    }

    #[test]
    fn test_empty_output_gives_empty_report() {
        let report = FailureReport::from_job(&failed_job(Vec::new()));
        assert!(report.is_empty());
        assert_eq!(report.name, "db1");
        assert_eq!(report.state, "failed");
        assert_eq!(report.task_id, "task-1");
    }
}
