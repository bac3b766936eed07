//! Starting executions, labels, kill, and listing.

use flowpilot_sdk::client::{ApiResponse, Method, RequestBody};
use flowpilot_sdk::prelude::*;
use flowpilot_sdk::testing::fixtures::{paged, ExecutionFixture};
use flowpilot_sdk::testing::MockTransport;

#[tokio::test]
async fn test_execute_sends_inputs_as_form_and_labels_as_query() {
    super::init_tracing();
    let mock = MockTransport::new();
    mock.on_json(
        Method::Post,
        "/executions/company.team/hello",
        200,
        ExecutionFixture::new("e1", "CREATED")
            .flow("company.team", "hello")
            .build(),
    );
    let client = mock.client().unwrap();

    let options = ExecuteOptions::new()
        .with_input("user", "Harry")
        .with_input("count", 3)
        .with_label("project", "hogwarts")
        .with_label("team", "data")
        .with_revision(0);
    let execution = client
        .execute("company.team", "hello", options)
        .await
        .unwrap();
    assert_eq!(execution.id, "e1");

    let requests = mock.requests_to(Method::Post, "/executions/company.team/hello");
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    let labels: Vec<&str> = request
        .query
        .iter()
        .filter(|(k, _)| k == "labels")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(labels, vec!["project:hogwarts", "team:data"]);
    assert_eq!(request.query_value("revision"), None);
    assert_eq!(request.query_value("wait"), None);
    match &request.body {
        RequestBody::Multipart(fields) => {
            assert!(fields.contains(&("user".to_string(), "Harry".to_string())));
            assert!(fields.contains(&("count".to_string(), "3".to_string())));
        }
        other => panic!("expected multipart body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_execute_rejects_reserved_flow_id() {
    let mock = MockTransport::new();
    let client = mock.client().unwrap();

    let err = client
        .execute("company.team", "resume", ExecuteOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::ReservedIdentifier { .. }));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_labels_require_terminal_state() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions/e1",
        200,
        ExecutionFixture::new("e1", "RUNNING").build(),
    );
    let client = mock.client().unwrap();

    let err = client
        .add_execution_labels("e1", &[Label::new("team", "data")])
        .await
        .unwrap_err();
    match err {
        FlowpilotError::TerminalStateRequired {
            execution_id,
            current,
        } => {
            assert_eq!(execution_id, "e1");
            assert_eq!(current, "RUNNING");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!mock.was_called(Method::Post, "/executions/e1/labels"));
}

#[tokio::test]
async fn test_labels_merge_with_existing() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions/e1",
        200,
        ExecutionFixture::new("e1", "SUCCESS")
            .label("a", "1")
            .label("b", "2")
            .build(),
    )
    .on(
        Method::Post,
        "/executions/e1/labels",
        ApiResponse::empty(200),
    );
    let client = mock.client().unwrap();

    let body = client
        .add_execution_labels("e1", &[Label::new("b", "3"), Label::new("c", "4")])
        .await
        .unwrap();
    assert_eq!(body, json!({}));

    let sent = mock.requests_to(Method::Post, "/executions/e1/labels");
    assert_eq!(
        sent[0].body,
        RequestBody::Json(json!([
            { "key": "a", "value": "1" },
            { "key": "b", "value": "3" },
            { "key": "c", "value": "4" },
        ]))
    );
}

#[tokio::test]
async fn test_kill_maps_status_codes_without_erroring() {
    let mock = MockTransport::new();
    mock.on(Method::Delete, "/executions/a/kill", ApiResponse::empty(202))
        .on(Method::Delete, "/executions/b/kill", ApiResponse::empty(404))
        .on(Method::Delete, "/executions/c/kill", ApiResponse::empty(409))
        .on(Method::Delete, "/executions/d/kill", ApiResponse::empty(500));
    let client = mock.client().unwrap();

    let outcomes = [
        client.kill_execution("a", true).await.unwrap().status,
        client.kill_execution("b", false).await.unwrap().status,
        client.kill_execution("c", false).await.unwrap().status,
        client.kill_execution("d", false).await.unwrap().status,
    ];
    assert_eq!(
        outcomes,
        [
            KillOutcome::KillRequested,
            KillOutcome::NotFound,
            KillOutcome::AlreadyFinished,
            KillOutcome::Unexpected(500),
        ]
    );
    let cascade = mock.requests_to(Method::Delete, "/executions/a/kill");
    assert_eq!(cascade[0].query_value("isOnKillCascade"), Some("true"));
}

#[tokio::test]
async fn test_manage_execution_actions() {
    let mock = MockTransport::new();
    mock.on(Method::Post, "/executions/e1/pause", ApiResponse::empty(200))
        .on(Method::Delete, "/executions/e1", ApiResponse::empty(204))
        .on_json(
            Method::Post,
            "/executions/e1/change-status",
            200,
            ExecutionFixture::new("e1", "WARNING").build(),
        );
    let client = mock.client().unwrap();

    let paused = client
        .manage_execution("e1", ExecutionAction::Pause)
        .await
        .unwrap();
    assert_eq!(paused.to_json().unwrap(), json!({ "status": "paused" }));

    let deleted = client
        .manage_execution("e1", ExecutionAction::Delete)
        .await
        .unwrap();
    assert_eq!(deleted, ExecutionActionOutcome::Deleted(json!({})));

    let changed = client
        .manage_execution("e1", ExecutionAction::ChangeStatus("WARNING".to_string()))
        .await
        .unwrap();
    match changed {
        ExecutionActionOutcome::Execution(execution) => {
            assert_eq!(execution.current_state(), ExecutionState::Warning)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    let sent = mock.requests_to(Method::Post, "/executions/e1/change-status");
    assert_eq!(sent[0].query_value("status"), Some("WARNING"));
}

#[tokio::test]
async fn test_change_status_rejects_unknown_state_before_sending() {
    let mock = MockTransport::new();
    let client = mock.client().unwrap();

    let err = client
        .change_execution_status("e1", "DONE")
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::InvalidArgument(_)));
    assert!(err.to_string().contains("DONE"));

    let err = client.change_execution_status("e1", " ").await.unwrap_err();
    assert!(matches!(err, FlowpilotError::MissingArgument(_)));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn test_get_execution_surfaces_engine_errors() {
    let mock = MockTransport::new();
    mock.on(
        Method::Get,
        "/executions/missing",
        ApiResponse::new(404, "execution not found"),
    );
    let client = mock.client().unwrap();

    let err = client.get_execution("missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("execution not found"));
}

#[tokio::test]
async fn test_list_executions_sorted_newest_first_and_truncated() {
    let mock = MockTransport::new();
    mock.on_query(
        Method::Get,
        "/executions",
        &[("page", "1")],
        ApiResponse::json(
            200,
            &paged(vec![
                ExecutionFixture::new("old", "SUCCESS")
                    .started_at("2024-01-01T00:00:00Z")
                    .build(),
                ExecutionFixture::new("new", "FAILED")
                    .started_at("2024-01-03T00:00:00Z")
                    .build(),
                ExecutionFixture::new("mid", "SUCCESS")
                    .started_at("2024-01-02T00:00:00Z")
                    .build(),
            ]),
        ),
    );
    let client = mock.client().unwrap();

    let executions = client
        .list_executions(ListExecutionsQuery::new("company.team").count(2).page_size(5))
        .await
        .unwrap();
    let ids: Vec<&str> = executions.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid"]);

    // A short first page ends the walk.
    assert_eq!(mock.requests_to(Method::Get, "/executions").len(), 1);
}

#[tokio::test]
async fn test_list_executions_tolerates_unrecognized_states() {
    let mock = MockTransport::new();
    mock.on_query(
        Method::Get,
        "/executions",
        &[("page", "1")],
        ApiResponse::json(
            200,
            &paged(vec![
                ExecutionFixture::new("known", "SUCCESS")
                    .started_at("2024-01-01T00:00:00Z")
                    .build(),
                ExecutionFixture::new("paused-at-breakpoint", "BREAKPOINT")
                    .started_at("2024-01-02T00:00:00Z")
                    .build(),
            ]),
        ),
    );
    mock.on_json(
        Method::Get,
        "/executions/paused-at-breakpoint",
        200,
        ExecutionFixture::new("paused-at-breakpoint", "BREAKPOINT").build(),
    );
    let client = mock.client().unwrap();

    let executions = client
        .list_executions(ListExecutionsQuery::new("company.team"))
        .await
        .unwrap();
    assert_eq!(executions.len(), 2);
    assert_eq!(executions[0].id, "paused-at-breakpoint");
    assert_eq!(executions[0].current_state(), ExecutionState::Unknown);
    assert_eq!(executions[1].current_state(), ExecutionState::Success);

    let err = client
        .add_execution_labels("paused-at-breakpoint", &[Label::new("team", "data")])
        .await
        .unwrap_err();
    assert!(matches!(err, FlowpilotError::TerminalStateRequired { .. }));
    assert!(!mock.was_called(Method::Post, "/executions/paused-at-breakpoint/labels"));
}

#[tokio::test]
async fn test_list_executions_walks_full_pages_until_short_page() {
    let mock = MockTransport::new();
    let page = |ids: &[&str]| {
        ApiResponse::json(
            200,
            &paged(
                ids.iter()
                    .map(|id| {
                        ExecutionFixture::new(*id, "SUCCESS")
                            .started_at("2024-01-01T00:00:00Z")
                            .build()
                    })
                    .collect(),
            ),
        )
    };
    mock.on_query(Method::Get, "/executions", &[("page", "1")], page(&["a", "b"]))
        .on_query(Method::Get, "/executions", &[("page", "2")], page(&["c", "d"]))
        .on_query(Method::Get, "/executions", &[("page", "3")], page(&["e"]));
    let client = mock.client().unwrap();

    let executions = client
        .list_executions(
            ListExecutionsQuery::new("company.team")
                .flow_id("etl")
                .page_size(2),
        )
        .await
        .unwrap();
    assert_eq!(executions.len(), 5);

    let requests = mock.requests_to(Method::Get, "/executions");
    assert_eq!(requests.len(), 3);
    assert!(requests
        .iter()
        .all(|r| r.query_value("flowId") == Some("etl") && r.query_value("size") == Some("2")));
}

#[tokio::test]
async fn test_list_executions_minutes_drops_old_and_undated() {
    let recent = (chrono::Utc::now() - chrono::Duration::minutes(5)).to_rfc3339();
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/executions",
        200,
        paged(vec![
            ExecutionFixture::new("recent", "RUNNING")
                .started_at(recent)
                .build(),
            ExecutionFixture::new("stale", "SUCCESS")
                .started_at("2020-01-01T00:00:00Z")
                .build(),
            ExecutionFixture::new("undated", "CREATED").build(),
        ]),
    );
    let client = mock.client().unwrap();

    let executions = client
        .list_executions(ListExecutionsQuery::new("company.team").minutes(60))
        .await
        .unwrap();
    let ids: Vec<&str> = executions.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["recent"]);
}
