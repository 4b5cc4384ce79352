/// Job completion waiter
///
/// Polls a remote job until it reaches a terminal state, the overall
/// timeout elapses, or the caller cancels. One waiter call owns its loop
/// sequentially; nothing is shared across calls, so independent resources
/// can be waited on concurrently from separate tasks.
///
/// The timeout is a single budget for the whole operation: every network
/// call, poll pause and retry backoff races the same deadline.
use crate::modules::jobs::application::poll_policy::PollPolicy;
use crate::modules::jobs::domain::accessor::JobAccessor;
use crate::modules::jobs::domain::entities::{Job, JobView};
use crate::modules::jobs::domain::services::{classify, Decision, ReportRenderer};
use crate::modules::jobs::domain::value_objects::{JobIntent, JobMetadata};
use crate::shared::errors::{ApiError, WaitError};
use crate::shared::utils::LogContext;
use crate::{log_debug, log_info, log_warn};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Everything a single wait needs to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitRequest {
    pub job_type: String,
    pub name: String,
    pub affinity: String,
    pub intent: JobIntent,
    pub timeout: Duration,
    pub retry_enabled: bool,
    pub retry_backoff: Duration,
}

impl WaitRequest {
    pub fn new(metadata: &JobMetadata, intent: JobIntent) -> Self {
        Self {
            job_type: metadata.job_type.clone(),
            name: metadata.name.clone(),
            affinity: metadata.affinity.clone(),
            intent,
            timeout: metadata.timeout,
            retry_enabled: metadata.retry,
            retry_backoff: metadata.wait_retry,
        }
    }

    fn expectation(&self, job: &Job) -> String {
        format!(
            "Expected job '{}' to be {} but was in state {}",
            self.name,
            self.intent.expected_state(),
            job.state
        )
    }
}

/// Last non-terminal observation, used when the budget runs out
struct Observation {
    decision: Decision,
    state: String,
    report: String,
}

impl Observation {
    fn of(decision: Decision, job: Option<&Job>) -> Self {
        match job {
            Some(job) => Self {
                decision,
                state: job.state.to_string(),
                report: ReportRenderer::render_job(job),
            },
            None => Self {
                decision,
                state: "unknown".to_string(),
                report: String::new(),
            },
        }
    }
}

enum Bounded<T> {
    Done(T),
    Expired,
    Cancelled,
}

pub struct JobWaiter {
    accessor: Arc<dyn JobAccessor>,
    poll_policy: PollPolicy,
}

impl JobWaiter {
    pub fn new(accessor: Arc<dyn JobAccessor>) -> Self {
        Self {
            accessor,
            poll_policy: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll_policy: PollPolicy) -> Self {
        self.poll_policy = poll_policy;
        self
    }

    /// Wait until the job is done.
    ///
    /// Returns the read-back resource view on success, or `None` when the
    /// success has nothing to read back (a completed deletion).
    pub async fn wait(&self, request: &WaitRequest) -> Result<Option<JobView>, WaitError> {
        self.wait_with_cancel(request, CancellationToken::new())
            .await
    }

    pub async fn wait_with_cancel(
        &self,
        request: &WaitRequest,
        cancel: CancellationToken,
    ) -> Result<Option<JobView>, WaitError> {
        let start = Instant::now();
        let deadline = start + request.timeout;
        let mut last: Option<Observation> = None;
        let mut attempt: u32 = 0;

        log_debug!(
            "Waiting up to {:?} for job {}/{} ({})",
            request.timeout,
            request.job_type,
            request.name,
            request.intent
        );

        loop {
            attempt += 1;

            let fetched = match bounded(
                deadline,
                &cancel,
                self.accessor.fetch(&request.job_type, &request.name),
            )
            .await
            {
                Bounded::Done(fetched) => fetched,
                Bounded::Expired => return expire(request, last),
                Bounded::Cancelled => return Err(cancelled(request)),
            };

            let decision = classify(&fetched, request.intent, request.retry_enabled);
            let job = fetched.as_ref().ok().and_then(Option::as_ref);

            LogContext::job_poll(
                &request.job_type,
                &request.name,
                attempt,
                job.map(|j| j.state.as_str()).unwrap_or("<none>"),
            );

            match decision {
                Decision::Succeeded => return self.read_back(request, deadline, &cancel).await,
                Decision::VanishedDuringDeletion => {
                    log_info!(
                        "Job {}/{} is gone, deletion complete",
                        request.job_type,
                        request.name
                    );
                    return Ok(None);
                }
                Decision::PendingDuringDeletion => {
                    if start.elapsed() >= request.timeout {
                        log_warn!(
                            "Job '{}' still pending after {:?}, accepting deletion",
                            request.name,
                            request.timeout
                        );
                        return Ok(None);
                    }
                    log_debug!(
                        "Job '{}' is pending, waiting for state change",
                        request.name
                    );
                    last = Some(Observation::of(decision, job));
                }
                Decision::FailedRetryable => {
                    let observation = Observation::of(decision, job);
                    log_warn!(
                        "Job '{}' failed, asking for a retry in {:?}",
                        request.name,
                        request.retry_backoff
                    );

                    match bounded(
                        deadline,
                        &cancel,
                        tokio::time::sleep(request.retry_backoff),
                    )
                    .await
                    {
                        Bounded::Done(()) => {}
                        Bounded::Expired => return expire(request, Some(observation)),
                        Bounded::Cancelled => return Err(cancelled(request)),
                    }

                    match bounded(
                        deadline,
                        &cancel,
                        self.accessor.retry(&request.job_type, &request.name),
                    )
                    .await
                    {
                        Bounded::Done(Ok(_)) => {}
                        Bounded::Done(Err(source)) => {
                            return Err(WaitError::RetryTriggerFailed {
                                name: request.name.clone(),
                                expected: request.intent.expected_state().to_string(),
                                state: observation.state,
                                source,
                                report: observation.report,
                            });
                        }
                        Bounded::Expired => return expire(request, Some(observation)),
                        Bounded::Cancelled => return Err(cancelled(request)),
                    }

                    last = Some(observation);
                }
                Decision::FailedTerminal => {
                    let observation = Observation::of(decision, job);
                    log_warn!(
                        "Job '{}' reported state {}",
                        request.name,
                        observation.state
                    );
                    return Err(WaitError::RemoteJobFailure {
                        name: request.name.clone(),
                        expected: request.intent.expected_state().to_string(),
                        state: observation.state,
                        report: observation.report,
                    });
                }
                Decision::StillRunning => {
                    let observation = Observation::of(decision, job);
                    if let Some(job) = job {
                        log_debug!("{}{}", request.expectation(job), observation.report);
                    }
                    last = Some(observation);
                }
                Decision::FetchFailed => {
                    return Err(match fetched {
                        Err(source) => WaitError::Transport {
                            name: request.name.clone(),
                            source,
                        },
                        Ok(_) => WaitError::EmptyJob {
                            name: request.name.clone(),
                        },
                    });
                }
            }

            let delay = self.poll_policy.calculate_delay(attempt - 1);
            match bounded(deadline, &cancel, tokio::time::sleep(delay)).await {
                Bounded::Done(()) => {}
                Bounded::Expired => return expire(request, last),
                Bounded::Cancelled => return Err(cancelled(request)),
            }
        }
    }

    async fn read_back(
        &self,
        request: &WaitRequest,
        deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<Option<JobView>, WaitError> {
        let read = self
            .accessor
            .read(&request.job_type, &request.affinity, &request.name);

        match bounded(deadline, cancel, read).await {
            Bounded::Done(Ok(view)) => {
                log_info!(
                    "Job {}/{} is {}",
                    request.job_type,
                    request.name,
                    request.intent.expected_state()
                );
                Ok(view)
            }
            Bounded::Done(Err(source)) => Err(WaitError::ReadBack {
                name: request.name.clone(),
                source,
            }),
            Bounded::Expired => Err(WaitError::ReadBack {
                name: request.name.clone(),
                source: ApiError::Timeout,
            }),
            Bounded::Cancelled => Err(cancelled(request)),
        }
    }
}

async fn bounded<F>(deadline: Instant, cancel: &CancellationToken, operation: F) -> Bounded<F::Output>
where
    F: Future,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Bounded::Cancelled,
        _ = tokio::time::sleep_until(deadline) => Bounded::Expired,
        output = operation => Bounded::Done(output),
    }
}

/// Budget exhausted. A deletion last seen pending is accepted; anything
/// else is reported as a timeout, distinct from a remote failure.
fn expire(request: &WaitRequest, last: Option<Observation>) -> Result<Option<JobView>, WaitError> {
    match last {
        Some(observation) if observation.decision == Decision::PendingDuringDeletion => {
            log_warn!(
                "Job '{}' still pending after {:?}, accepting deletion",
                request.name,
                request.timeout
            );
            Ok(None)
        }
        Some(observation) => Err(WaitError::TimeoutExceeded {
            name: request.name.clone(),
            timeout: request.timeout,
            last_state: observation.state,
            report: observation.report,
        }),
        None => Err(WaitError::TimeoutExceeded {
            name: request.name.clone(),
            timeout: request.timeout,
            last_state: "unknown".to_string(),
            report: String::new(),
        }),
    }
}

fn cancelled(request: &WaitRequest) -> WaitError {
    WaitError::Cancelled {
        name: request.name.clone(),
    }
}
