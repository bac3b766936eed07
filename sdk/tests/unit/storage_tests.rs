//! Namespace files and key-value store.

use flowpilot_sdk::client::{ApiResponse, EntryKind, Method, RequestBody};
use flowpilot_sdk::prelude::*;
use flowpilot_sdk::testing::MockTransport;

const FILES: &str = "/namespaces/company.team/files";
const DIRECTORY: &str = "/namespaces/company.team/files/directory";

#[tokio::test]
async fn test_create_and_read_file() {
    super::init_tracing();
    let mock = MockTransport::new();
    mock.on(Method::Post, FILES, ApiResponse::empty(200))
        .on(Method::Get, FILES, ApiResponse::new(200, "print('hi')\n"));
    let client = mock.client().unwrap();

    client
        .create_file("company.team", "scripts/run.py", b"print('hi')\n".to_vec())
        .await
        .unwrap();
    let content = client
        .get_file("company.team", "scripts/run.py")
        .await
        .unwrap();
    assert_eq!(content, b"print('hi')\n".to_vec());

    let upload = mock.requests_to(Method::Post, FILES);
    assert_eq!(upload[0].query_value("path"), Some("scripts/run.py"));
    match &upload[0].body {
        RequestBody::File { file_name, bytes } => {
            assert_eq!(file_name, "scripts/run.py");
            assert_eq!(bytes, b"print('hi')\n");
        }
        other => panic!("expected file body, got {:?}", other),
    }
}

#[tokio::test]
async fn test_move_file_success() {
    let mock = MockTransport::new();
    mock.on(Method::Put, FILES, ApiResponse::empty(200));
    let client = mock.client().unwrap();

    let outcome = client
        .move_file("company.team", "a.txt", "archive/a.txt")
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Moved(json!({ "status": "moved" })));
    let sent = mock.requests_to(Method::Put, FILES);
    assert_eq!(sent[0].query_value("from"), Some("a.txt"));
    assert_eq!(sent[0].query_value("to"), Some("archive/a.txt"));
}

#[tokio::test]
async fn test_move_reports_missing_source() {
    let mock = MockTransport::new();
    mock.on(Method::Put, FILES, ApiResponse::empty(404))
        .on(Method::Get, FILES, ApiResponse::empty(404));
    let client = mock.client().unwrap();

    let outcome = client
        .move_file("company.team", "gone.txt", "archive/gone.txt")
        .await
        .unwrap();
    assert_eq!(
        outcome.to_string(),
        "Error: The source file 'gone.txt' does not exist in namespace 'company.team'."
    );
    assert!(!mock.was_called(Method::Get, DIRECTORY));
}

#[tokio::test]
async fn test_move_reports_missing_destination_parent() {
    let mock = MockTransport::new();
    mock.on(Method::Put, FILES, ApiResponse::empty(404))
        .on(Method::Get, DIRECTORY, ApiResponse::empty(200))
        .on_query(
            Method::Get,
            DIRECTORY,
            &[("path", "archive/2024")],
            ApiResponse::empty(404),
        );
    let client = mock.client().unwrap();

    let outcome = client
        .move_directory("company.team", "reports", "archive/2024/reports")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::DestinationParentMissing {
            kind: EntryKind::Directory,
            namespace: "company.team".to_string(),
            parent: "archive/2024".to_string(),
        }
    );
    assert_eq!(
        outcome.to_string(),
        "Error: The destination parent directory 'archive/2024' does not exist in namespace \
         'company.team'. Please create it first."
    );
    let probes = mock.requests_to(Method::Get, DIRECTORY);
    assert_eq!(probes[0].query_value("path"), Some("reports"));
    assert_eq!(probes[1].query_value("path"), Some("archive/2024"));
}

#[tokio::test]
async fn test_move_with_both_paths_present_is_generic_not_found() {
    let mock = MockTransport::new();
    mock.on(Method::Put, FILES, ApiResponse::empty(404))
        .on(Method::Get, FILES, ApiResponse::new(200, "x"))
        .on(Method::Get, DIRECTORY, ApiResponse::empty(200));
    let client = mock.client().unwrap();

    let outcome = client
        .move_file("company.team", "a.txt", "b/a.txt")
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::NotFound);
}

#[tokio::test]
async fn test_delete_missing_directory() {
    let mock = MockTransport::new();
    mock.on(Method::Delete, FILES, ApiResponse::empty(404));
    let client = mock.client().unwrap();

    let err = client
        .delete_directory("company.team", "old")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Not found: The directory 'old' does not exist in namespace 'company.team'."
    );
}

#[tokio::test]
async fn test_kv_set_encodes_by_literal_type() {
    let mock = MockTransport::new();
    mock.on(
        Method::Put,
        "/namespaces/company.team/kv/cfg",
        ApiResponse::empty(200),
    );
    let client = mock.client().unwrap();

    for value in [
        json!("hello"),
        json!("2024-03-15"),
        json!(42),
        json!({ "retries": 3 }),
    ] {
        client.kv_set("company.team", "cfg", &value).await.unwrap();
    }

    let bodies: Vec<String> = mock
        .requests_to(Method::Put, "/namespaces/company.team/kv/cfg")
        .into_iter()
        .map(|r| match r.body {
            RequestBody::Raw {
                content,
                content_type,
            } => {
                assert_eq!(content_type, "application/json");
                content
            }
            other => panic!("expected raw body, got {:?}", other),
        })
        .collect();
    assert_eq!(
        bodies,
        vec![
            "\"hello\"".to_string(),
            "2024-03-15".to_string(),
            "42".to_string(),
            "{\"retries\":3}".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_kv_list_and_get() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        "/namespaces/company.team/kv",
        200,
        json!([
            { "key": "cfg", "creationDate": "2024-01-01T00:00:00Z" },
            { "key": "token" },
        ]),
    )
    .on_json(
        Method::Get,
        "/namespaces/company.team/kv/cfg",
        200,
        json!({ "type": "JSON", "value": { "retries": 3 } }),
    );
    let client = mock.client().unwrap();

    let keys: Vec<String> = client
        .kv_list("company.team")
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.key)
        .collect();
    assert_eq!(keys, vec!["cfg".to_string(), "token".to_string()]);

    let value = client.kv_get("company.team", "cfg").await.unwrap();
    assert_eq!(value["value"]["retries"], json!(3));
}

#[tokio::test]
async fn test_kv_delete() {
    let mock = MockTransport::new();
    mock.on(
        Method::Delete,
        "/namespaces/company.team/kv/cfg",
        ApiResponse::empty(204),
    )
    .on(
        Method::Delete,
        "/namespaces/company.team/kv/missing",
        ApiResponse::empty(404),
    );
    let client = mock.client().unwrap();

    assert_eq!(client.kv_delete("company.team", "cfg").await.unwrap(), None);

    let err = client
        .kv_delete("company.team", "missing")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Not found: Key 'missing' not found in namespace 'company.team'."
    );
}

#[tokio::test]
async fn test_directory_listing_and_creation() {
    let mock = MockTransport::new();
    mock.on_json(
        Method::Get,
        DIRECTORY,
        200,
        json!([{ "fileName": "run.py", "type": "File" }]),
    )
    .on(Method::Post, DIRECTORY, ApiResponse::empty(200))
    .on_json(
        Method::Get,
        "/namespaces/company.team/files/search",
        200,
        json!(["/scripts/run.py"]),
    );
    let client = mock.client().unwrap();

    let root = client.list_directory("company.team", None).await.unwrap();
    assert_eq!(root[0]["fileName"], json!("run.py"));
    client
        .list_directory("company.team", Some("scripts"))
        .await
        .unwrap();
    let listings = mock.requests_to(Method::Get, DIRECTORY);
    assert_eq!(listings[0].query_value("path"), None);
    assert_eq!(listings[1].query_value("path"), Some("scripts"));

    let created = client
        .create_directory("company.team", "reports")
        .await
        .unwrap();
    assert_eq!(created, json!({ "status": "directory_created" }));

    let hits = client.search_files("company.team", "run").await.unwrap();
    assert_eq!(hits, json!(["/scripts/run.py"]));
}
