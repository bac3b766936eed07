//! Restart, replay, resume, force-run, and task-run state changes.

use flowpilot_sdk::client::{ApiResponse, Method, RequestBody};
use flowpilot_sdk::prelude::*;
use flowpilot_sdk::testing::fixtures::{flow, paged, pause_task, ExecutionFixture};
use flowpilot_sdk::testing::MockTransport;

fn daily_etl_history() -> Value {
    paged(vec![
        ExecutionFixture::new("t1", "FAILED")
            .flow("company.team", "daily-etl")
            .started_at("2024-01-01T00:00:00Z")
            .build(),
        ExecutionFixture::new("t2", "SUCCESS")
            .flow("company.team", "daily-etl")
            .started_at("2024-01-02T00:00:00Z")
            .build(),
        ExecutionFixture::new("t3", "FAILED")
            .flow("company.team", "daily-etl")
            .started_at("2024-01-03T00:00:00Z")
            .build(),
    ])
}

#[tokio::test]
async fn test_restart_without_id_targets_latest_failed() {
    super::init_tracing();
    let mock = MockTransport::new();
    mock.on_json(Method::Get, "/executions", 200, daily_etl_history())
        .on_json(
            Method::Post,
            "/executions/t3/restart",
            200,
            ExecutionFixture::new("t3", "RESTARTED")
                .flow("company.team", "daily-etl")
                .build(),
        );
    let client = mock.client().unwrap();

    let restarted = client
        .restart("company.team", "daily-etl", None, None)
        .await
        .unwrap();
    assert_eq!(restarted.id, "t3");

    let lookup = mock.requests_to(Method::Get, "/executions");
    assert_eq!(lookup[0].query_value("state"), Some("FAILED"));
    assert_eq!(lookup[0].query_value("sort"), Some("state.startDate,desc"));
    assert!(!mock.was_called(Method::Post, "/executions/t1/restart"));
}

#[tokio::test]
async fn test_restart_rejects_non_failed_execution() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions/t2",
        200,
        ExecutionFixture::new("t2", "SUCCESS").build(),
    );
    let client = mock.client().unwrap();

    let err = client
        .restart("company.team", "daily-etl", Some("t2"), Some(4))
        .await
        .unwrap_err();
    match &err {
        FlowpilotError::InvalidStateTransition {
            execution_id,
            current,
            allowed,
        } => {
            assert_eq!(execution_id, "t2");
            assert_eq!(current, "SUCCESS");
            assert_eq!(allowed, &vec![ExecutionState::Failed]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.to_string().contains("SUCCESS"));
    assert!(!mock.was_called(Method::Post, "/executions/t2/restart"));
}

#[tokio::test]
async fn test_restart_passes_revision() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions/t1",
        200,
        ExecutionFixture::new("t1", "FAILED").build(),
    )
    .on_json(
        Method::Post,
        "/executions/t1/restart",
        200,
        ExecutionFixture::new("t1", "RESTARTED").build(),
    );
    let client = mock.client().unwrap();

    client
        .restart("company.team", "daily-etl", Some("t1"), Some(4))
        .await
        .unwrap();
    let sent = mock.requests_to(Method::Post, "/executions/t1/restart");
    assert_eq!(sent[0].query_value("revision"), Some("4"));
}

#[tokio::test]
async fn test_restart_without_failed_history_is_not_found() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions",
        200,
        paged(vec![ExecutionFixture::new("ok", "SUCCESS").build()]),
    );
    let client = mock.client().unwrap();

    let err = client
        .restart("company.team", "daily-etl", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::NotFound(_)));
}

#[tokio::test]
async fn test_force_run_allowed_states() {
    let mock = MockTransport::new();
    for (id, state) in [
        ("created", "CREATED"),
        ("paused", "PAUSED"),
        ("queued", "QUEUED"),
        ("running", "RUNNING"),
        ("done", "SUCCESS"),
    ] {
        mock.on_json(
            Method::Get,
            &format!("/executions/{}", id),
            200,
            ExecutionFixture::new(id, state).build(),
        )
        .on_json(
            Method::Post,
            &format!("/executions/{}/force-run", id),
            200,
            ExecutionFixture::new(id, "RUNNING").build(),
        );
    }
    let client = mock.client().unwrap();

    for id in ["created", "paused", "queued"] {
        let forced = client.force_run(id).await.unwrap();
        assert_eq!(forced.current_state(), ExecutionState::Running);
    }
    for id in ["running", "done"] {
        let err = client.force_run(id).await.unwrap_err();
        assert!(
            matches!(err, FlowpilotError::InvalidStateTransition { .. }),
            "{id}: {err:?}"
        );
        assert!(!mock.was_called(Method::Post, &format!("/executions/{}/force-run", id)));
    }
}

#[tokio::test]
async fn test_replay_latest_in_any_state() {
    let mock = MockTransport::new();
    mock.on_json(Method::Get, "/executions", 200, daily_etl_history())
        .on_json(
            Method::Post,
            "/executions/replay/by-ids",
            200,
            json!({ "count": 1 }),
        );
    let client = mock.client().unwrap();

    let result = client
        .replay(ExecutionTarget::latest_of("company.team", "daily-etl"), true)
        .await
        .unwrap();
    assert_eq!(result.execution_ids, vec!["t3".to_string()]);
    assert_eq!(result.response, json!({ "count": 1 }));

    let lookup = mock.requests_to(Method::Get, "/executions");
    assert_eq!(lookup[0].query_value("state"), None);
    let sent = mock.requests_to(Method::Post, "/executions/replay/by-ids");
    assert_eq!(sent[0].body, RequestBody::Json(json!(["t3"])));
    assert_eq!(sent[0].query_value("latestRevision"), Some("true"));
}

#[tokio::test]
async fn test_replay_with_no_history_is_not_found() {
    let mock = MockTransport::new();
    mock.on_json(Method::Get, "/executions", 200, paged(vec![]));
    let client = mock.client().unwrap();

    let err = client
        .replay(ExecutionTarget::latest_of("company.team", "empty"), false)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Not found: No executions found for company.team/empty."
    );
}

#[tokio::test]
async fn test_replay_empty_id_list_sends_nothing() {
    let mock = MockTransport::new();
    let client = mock.client().unwrap();

    let err = client
        .replay(ExecutionTarget::Ids(vec![]), false)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::MissingArgument(_)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_resume_empty_id_list_sends_nothing() {
    let mock = MockTransport::new();
    let client = mock.client().unwrap();

    let err = client
        .resume(ExecutionTarget::Ids(vec![]), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::MissingArgument(_)));

    let mut fields = Map::new();
    fields.insert("approved".to_string(), json!(true));
    let err = client
        .resume(ExecutionTarget::Ids(vec![]), Some(fields))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::MissingArgument(_)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_resume_ids_without_fields_uses_bulk_endpoint() {
    let mock = MockTransport::new();
    mock.on(
        Method::Post,
        "/executions/resume/by-ids",
        ApiResponse::empty(204),
    );
    let client = mock.client().unwrap();

    let outcome = client
        .resume(ExecutionTarget::ids(["a", "b"]), None)
        .await
        .unwrap();
    assert_eq!(outcome, ResumeOutcome::Bulk(json!({})));
    let sent = mock.requests_to(Method::Post, "/executions/resume/by-ids");
    assert_eq!(sent[0].body, RequestBody::Json(json!(["a", "b"])));
}

#[tokio::test]
async fn test_resume_ids_with_fields_resumes_each() {
    let mock = MockTransport::new();
    mock.on(Method::Post, "/executions/a/resume", ApiResponse::empty(204))
        .on_json(Method::Post, "/executions/b/resume", 200, json!({ "id": "b" }));
    let client = mock.client().unwrap();

    let mut fields = Map::new();
    fields.insert("approved".to_string(), json!(true));
    let outcome = client
        .resume(ExecutionTarget::ids(["a", "b"]), Some(fields))
        .await
        .unwrap();
    match outcome {
        ResumeOutcome::PerExecution(results) => {
            assert_eq!(results.get("a"), Some(&json!({})));
            assert_eq!(results.get("b"), Some(&json!({ "id": "b" })));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let sent = mock.requests_to(Method::Post, "/executions/a/resume");
    assert_eq!(
        sent[0].body,
        RequestBody::Multipart(vec![("approved".to_string(), "true".to_string())])
    );
    assert!(!mock.was_called(Method::Post, "/executions/resume/by-ids"));
}

#[tokio::test]
async fn test_resume_latest_falls_back_to_pause_defaults() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions",
        200,
        paged(vec![
            ExecutionFixture::new("p1", "PAUSED")
                .flow("company.team", "approval")
                .started_at("2024-02-01T00:00:00Z")
                .build(),
            ExecutionFixture::new("r1", "RUNNING")
                .flow("company.team", "approval")
                .started_at("2024-02-02T00:00:00Z")
                .build(),
        ]),
    )
    .on_json(
        Method::Get,
        "/flows/company.team/approval",
        200,
        flow(
            "company.team",
            "approval",
            vec![],
            vec![pause_task("wait", &[("reason", json!("auto"))])],
        ),
    )
    .on(Method::Post, "/executions/p1/resume", ApiResponse::empty(204));
    let client = mock.client().unwrap();

    let outcome = client
        .resume(ExecutionTarget::latest_of("company.team", "approval"), None)
        .await
        .unwrap();
    match outcome {
        ResumeOutcome::PerExecution(results) => {
            assert_eq!(results.len(), 1);
            assert_eq!(results.get("p1"), Some(&json!({})));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let sent = mock.requests_to(Method::Post, "/executions/p1/resume");
    assert_eq!(
        sent[0].body,
        RequestBody::Multipart(vec![("reason".to_string(), "auto".to_string())])
    );
}

#[tokio::test]
async fn test_resume_latest_without_paused_execution() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions",
        200,
        paged(vec![ExecutionFixture::new("r1", "RUNNING").build()]),
    );
    let client = mock.client().unwrap();

    let err = client
        .resume(ExecutionTarget::latest_of("company.team", "approval"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::NotFound(_)));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn test_change_taskrun_state_targets_first_failed_task_run() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions/e1",
        200,
        ExecutionFixture::new("e1", "FAILED")
            .task_run("tr1", "extract", "SUCCESS")
            .task_run("tr2", "transform", "FAILED")
            .task_run("tr3", "load", "FAILED")
            .build(),
    )
    .on_json(
        Method::Post,
        "/executions/e1/state",
        200,
        ExecutionFixture::new("e1", "RUNNING").build(),
    );
    let client = mock.client().unwrap();

    client.change_taskrun_state("e1", None, None).await.unwrap();
    let sent = mock.requests_to(Method::Post, "/executions/e1/state");
    assert_eq!(
        sent[0].body,
        RequestBody::Json(json!({ "taskRunId": "tr2", "state": "SUCCESS" }))
    );
}

#[tokio::test]
async fn test_change_taskrun_state_explicit_target_skips_lookup() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Post,
        "/executions/e1/state",
        200,
        ExecutionFixture::new("e1", "RUNNING").build(),
    );
    let client = mock.client().unwrap();

    client
        .change_taskrun_state("e1", Some(ExecutionState::Warning), Some("tr9"))
        .await
        .unwrap();
    assert!(!mock.was_called(Method::Get, "/executions/e1"));
    let sent = mock.requests_to(Method::Post, "/executions/e1/state");
    assert_eq!(
        sent[0].body,
        RequestBody::Json(json!({ "taskRunId": "tr9", "state": "WARNING" }))
    );
}

#[tokio::test]
async fn test_change_taskrun_state_rejects_unknown_target_state() {
    let mock = MockTransport::new();
    let client = mock.client().unwrap();

    let err = client
        .change_taskrun_state("e1", Some(ExecutionState::Unknown), Some("tr1"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::InvalidArgument(_)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_change_taskrun_state_without_failed_task_run() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions/e1",
        200,
        ExecutionFixture::new("e1", "SUCCESS")
            .task_run("tr1", "extract", "SUCCESS")
            .build(),
    );
    let client = mock.client().unwrap();

    let err = client
        .change_taskrun_state("e1", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::NotFound(_)));
}
