/// Job service tests - lifecycle operations end to end over HTTP
///
/// Tests cover:
/// - Create and update submit then wait for the job
/// - Idempotent deletion
/// - Submission failures
/// - Resource read and lookup
mod utils;

use dbaas_jobs::modules::jobs::application::{JobService, JobWaiter, PollPolicy};
use dbaas_jobs::modules::jobs::domain::{JobAccessor, JobMetadata, JobState, JobSubmitter};
use dbaas_jobs::modules::jobs::infrastructure::{ApiClient, ApiClientConfig, JobAccessorImpl};
use dbaas_jobs::shared::errors::{AppError, WaitError};
use mockito::ServerGuard;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use utils::factories::{finished_job, JobFactory};

const JOB_PATH: &str = "/jobs/database-postgres/db1";
const DETAILS_PATH: &str = "/jobs/database-postgres/db1/details";

fn service(server: &ServerGuard) -> JobService {
    let client = ApiClient::new(ApiClientConfig::new(server.url())).unwrap();
    let accessor = Arc::new(JobAccessorImpl::new(Arc::new(client)));
    let waiter = JobWaiter::new(accessor.clone() as Arc<dyn JobAccessor>)
        .with_poll_policy(PollPolicy::fixed(Duration::from_millis(10)));

    JobService::new(
        accessor.clone() as Arc<dyn JobSubmitter>,
        accessor as Arc<dyn JobAccessor>,
    )
    .with_waiter(waiter)
}

fn metadata() -> JobMetadata {
    JobMetadata::new("db1").with_timeout(Duration::from_secs(5))
}

#[tokio::test]
async fn create_submits_and_returns_read_back_view() {
    let mut server = mockito::Server::new_async().await;
    let submit = server
        .mock("POST", JOB_PATH)
        .with_status(200)
        .with_body(r#"{"status": "accepted"}"#)
        .create_async()
        .await;
    server
        .mock("GET", JOB_PATH)
        .with_status(200)
        .with_body(r#"{"name": "db1"}"#)
        .create_async()
        .await;
    server
        .mock("GET", DETAILS_PATH)
        .with_status(200)
        .with_body(serde_json::to_string(&finished_job()).unwrap())
        .create_async()
        .await;

    let view = service(&server)
        .create(&metadata(), &serde_json::json!({"dbname": "db1"}))
        .await
        .unwrap()
        .unwrap();

    submit.assert_async().await;
    assert_eq!(view.id, "database-postgres/all/db1");
    assert_eq!(view.state, JobState::Finished);
}

#[tokio::test]
async fn update_failure_surfaces_report() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("PUT", JOB_PATH)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    server
        .mock("GET", DETAILS_PATH)
        .with_status(200)
        .with_body(
            JobFactory::new()
                .state(JobState::Dead)
                .worker(
                    utils::factories::WorkerFactory::new("pg-1")
                        .failed("Logs: alter role Error: permission denied")
                        .build(),
                )
                .build_json(),
        )
        .create_async()
        .await;

    let err = service(&server)
        .update(&metadata(), &serde_json::json!({}))
        .await
        .unwrap_err();

    match err {
        AppError::Wait(WaitError::RemoteJobFailure { state, report, .. }) => {
            assert_eq!(state, "dead");
            assert!(report.contains("Error: permission denied"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn create_submission_error_is_wrapped() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", JOB_PATH)
        .with_status(400)
        .with_body("invalid size")
        .create_async()
        .await;

    let err = service(&server)
        .create(&metadata(), &serde_json::json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Submission { .. }));
    assert_eq!(
        err.to_string(),
        "Cannot create database 'db1' - HTTP 400: invalid size"
    );
}

#[tokio::test]
async fn invalid_metadata_is_rejected_before_any_call() {
    let server = mockito::Server::new_async().await;

    let err = service(&server)
        .create(&JobMetadata::new("bad name!"), &serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn delete_tolerates_500_and_vanished_job() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", JOB_PATH)
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;
    server
        .mock("GET", DETAILS_PATH)
        .with_status(404)
        .with_body("Job not found")
        .create_async()
        .await;

    assert_ok!(service(&server).delete(&metadata()).await);
}

#[tokio::test]
async fn delete_swallows_gone_read_back() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", JOB_PATH)
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    server
        .mock("GET", DETAILS_PATH)
        .with_status(200)
        .with_body(JobFactory::new().state(JobState::Deleted).build_json())
        .create_async()
        .await;
    server
        .mock("GET", JOB_PATH)
        .with_status(500)
        .with_body("Job db1 could not be deleted: Task error")
        .create_async()
        .await;

    assert_ok!(service(&server).delete(&metadata()).await);
}

#[tokio::test]
async fn delete_rejected_by_api_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", JOB_PATH)
        .with_status(403)
        .with_body("forbidden")
        .create_async()
        .await;

    let err = assert_err!(service(&server).delete(&metadata()).await);
    assert_eq!(
        err.to_string(),
        "Cannot delete database 'db1' - HTTP 403: forbidden"
    );
}

#[tokio::test]
async fn read_of_missing_resource_is_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", JOB_PATH)
        .with_status(404)
        .with_body("Job not found")
        .create_async()
        .await;

    let view = service(&server).read(&metadata()).await.unwrap();
    assert!(view.is_none());
}

#[tokio::test]
async fn lookup_returns_retried_outputs_and_decoded_database() {
    let mut server = mockito::Server::new_async().await;
    let details = server
        .mock("GET", DETAILS_PATH)
        .with_status(200)
        .with_body(
            r#"{
                "state": "finished",
                "taskid": "t-42",
                "current_data": "{\"dbname\": \"db1\", \"size\": 10}",
                "output": [
                    {"worker": "pg-1", "state": "finished", "data": "primary ok"},
                    {"worker": "pg-2", "state": "failed", "logs": "Logs: boom",
                     "retries": [{"worker": "pg-2r", "state": "finished", "data": "replica ok"}]}
                ]
            }"#,
        )
        .create_async()
        .await;

    let snapshot = service(&server).lookup(&metadata()).await.unwrap().unwrap();

    details.assert_async().await;
    assert_eq!(snapshot.id, "database-postgres/db1");
    assert_eq!(snapshot.task_id, "t-42");
    let workers: Vec<_> = snapshot.outputs.iter().map(|o| o.worker.as_str()).collect();
    assert_eq!(workers, vec!["pg-1", "pg-2r"]);
    assert_eq!(snapshot.outputs[1].data, "replica ok");
    assert_eq!(
        snapshot.database,
        Some(serde_json::json!({"dbname": "db1", "size": 10}))
    );
}

#[tokio::test]
async fn lookup_of_missing_database_is_none() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", DETAILS_PATH)
        .with_status(404)
        .with_body("Job not found")
        .create_async()
        .await;

    assert!(service(&server).lookup(&metadata()).await.unwrap().is_none());
}

#[tokio::test]
async fn lookup_failure_names_the_database() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", DETAILS_PATH)
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let err = assert_err!(service(&server).lookup(&metadata()).await);
    assert!(matches!(err, AppError::Lookup { .. }));
    assert_eq!(
        err.to_string(),
        "Unable to retrieve the database 'db1': HTTP 503: maintenance"
    );
}
