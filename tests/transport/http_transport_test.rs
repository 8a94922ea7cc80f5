use std::sync::{Arc, Mutex};

use arrow_array::{Int64Array, RecordBatch, StringArray};
use arrow_ipc::writer::StreamWriter;
use arrow_schema::{DataType, Field, Schema};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use sqlbench::result::QueryResult;
use sqlbench::transport::{
    Credentials, HttpTransport, QueryClient, QueryRequest, QueryResponse, QueryTransport,
    ResultFormat, Session, TransportError,
};

type Recorded = Arc<Mutex<Vec<Value>>>;

fn arrow_payload() -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec![Some("alpha"), None])),
        ],
    )
    .unwrap();

    let mut buffer = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buffer, &schema).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();
    }
    buffer
}

/// Mimics the query server: errors are keyed off the SQL text.
async fn handle_query(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Response {
    recorded.lock().unwrap().push(body.clone());

    let query = body["query"].as_str().unwrap_or_default();
    if query.contains("missing_table") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "line 1:15: Table 'hive.default.missing_table' does not exist"})),
        )
            .into_response();
    }
    if query.contains("gateway") {
        return (StatusCode::BAD_GATEWAY, "upstream down").into_response();
    }
    if query.contains("soft_error") {
        return Json(json!({"success": false, "error": "Access Denied: Cannot select from table"}))
            .into_response();
    }

    match body["format"].as_str() {
        Some("arrow") => (
            [(header::CONTENT_TYPE, "application/vnd.apache.arrow.stream")],
            arrow_payload(),
        )
            .into_response(),
        _ => Json(json!({
            "success": true,
            "columns": ["id", "name"],
            "types": ["bigint", "varchar"],
            "rows": [{"id": 1, "name": "alpha"}, {"id": 2, "name": null}],
            "error": null
        }))
        .into_response(),
    }
}

async fn spawn_server() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/trino", post(handle_query))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), recorded)
}

fn session() -> Session {
    Session::new(Credentials::new("alice", "s3cret"), "uat").with_extra_credentials(vec![
        ("hive.token".to_string(), "abc".to_string()),
        ("region".to_string(), "eu".to_string()),
    ])
}

#[tokio::test]
async fn test_json_response() {
    let (base, recorded) = spawn_server().await;
    let transport = HttpTransport::new(&base);

    let request = QueryRequest::new("SELECT id, name FROM t", &session(), ResultFormat::Json);
    let response = transport.send(request).await.unwrap();

    let QueryResponse::Table(table) = response else {
        panic!("expected a JSON table");
    };
    assert_eq!(table.columns, vec!["id", "name"]);
    assert_eq!(table.types, vec!["bigint", "varchar"]);
    assert_eq!(table.rows[0]["name"], json!("alpha"));
    assert_eq!(table.rows[1]["name"], Value::Null);

    let body = recorded.lock().unwrap()[0].clone();
    assert_eq!(
        body,
        json!({
            "query": "SELECT id, name FROM t",
            "user": "alice",
            "password": "s3cret",
            "environment": "uat",
            "format": "json",
            "extraCredentials": [["hive.token", "abc"], ["region", "eu"]]
        })
    );
}

#[tokio::test]
async fn test_arrow_response_is_returned_undecoded() {
    let (base, _) = spawn_server().await;
    let transport = HttpTransport::new(&base);

    let request = QueryRequest::new("SELECT id, name FROM t", &session(), ResultFormat::Arrow);
    let response = transport.send(request).await.unwrap();

    let QueryResponse::Columnar(bytes) = &response else {
        panic!("expected columnar bytes");
    };
    assert_eq!(bytes, &arrow_payload());

    let table = response.into_table().unwrap();
    assert_eq!(table.columns, vec!["id", "name"]);
    assert_eq!(table.types, vec!["Int64", "Utf8"]);
    assert_eq!(table.rows[0]["id"], json!(1));
    assert_eq!(table.rows[1]["name"], Value::Null);
}

#[tokio::test]
async fn test_engine_error_message_is_verbatim() {
    let (base, _) = spawn_server().await;
    let transport = HttpTransport::new(&base);

    let request = QueryRequest::new("SELECT * FROM missing_table", &session(), ResultFormat::Json);
    let err = transport.send(request).await.unwrap_err();

    assert!(err.is_engine_error());
    assert!(matches!(err, TransportError::Engine { status: Some(400), .. }));
    assert_eq!(
        err.to_string(),
        "line 1:15: Table 'hive.default.missing_table' does not exist"
    );
}

#[tokio::test]
async fn test_error_inside_success_body() {
    let (base, _) = spawn_server().await;
    let transport = HttpTransport::new(&base);

    let request = QueryRequest::new("SELECT soft_error", &session(), ResultFormat::Json);
    let err = transport.send(request).await.unwrap_err();
    assert_eq!(err.to_string(), "Access Denied: Cannot select from table");
}

#[tokio::test]
async fn test_non_json_error_body() {
    let (base, _) = spawn_server().await;
    let transport = HttpTransport::new(&base);

    let request = QueryRequest::new("SELECT gateway", &session(), ResultFormat::Arrow);
    let err = transport.send(request).await.unwrap_err();

    match &err {
        TransportError::Status { status, body } => {
            assert_eq!(*status, 502);
            assert_eq!(body, "upstream down");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_retriable());
}

#[tokio::test]
async fn test_client_sends_rewritten_sql() {
    let (base, recorded) = spawn_server().await;
    let client = QueryClient::new(HttpTransport::new(&base));

    let result = client
        .query_table("SELECT id, name FROM t", 100, &session(), ResultFormat::Json)
        .await;
    assert!(result.is_success());

    let sent = recorded.lock().unwrap()[0]["query"].clone();
    assert_eq!(sent, json!("SELECT * FROM (\nSELECT id, name FROM t\n) LIMIT 100"));

    let outward = serde_json::to_value(&result).unwrap();
    assert_eq!(outward["success"], json!(true));
    assert_eq!(outward["columns"], json!(["id", "name"]));
    assert_eq!(outward["rows"][0]["id"], json!(1));
}

#[tokio::test]
async fn test_client_failure_shape() {
    let (base, _) = spawn_server().await;
    let client = QueryClient::new(HttpTransport::new(&base));

    let result = client
        .query_table("SELECT * FROM missing_table", 10, &session(), ResultFormat::Arrow)
        .await;

    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "success": false,
            "error": "line 1:15: Table 'hive.default.missing_table' does not exist"
        })
    );
    assert!(matches!(result, QueryResult::Failure { .. }));
}

#[tokio::test]
async fn test_unreachable_server() {
    let transport = HttpTransport::new("http://127.0.0.1:9");
    let request = QueryRequest::new("SELECT 1", &session(), ResultFormat::Json);
    let err = transport.send(request).await.unwrap_err();
    assert!(matches!(err, TransportError::Http(_)));
}
