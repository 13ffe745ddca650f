//! BackendClient against an in-process fake backend

use std::time::Duration;

use agent_composer::submit::{AgentSubmission, BackendClient, SubmitError, Submitter};
use axum::{
    extract::Path,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn create_agent(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let field = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    if field("name").is_empty() || field("purpose").is_empty() || field("automation_steps").is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing required fields"})),
        );
    }
    (
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "Agent creation request received. Building in background.",
            "agent_id": 42,
            "status": "pending"
        })),
    )
}

async fn agent_status(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
    if id != 42 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Agent not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": 42,
            "name": "Planner",
            "status": "building",
            "purpose": "Plans",
            "created_at": "2026-10-16T09:00:00"
        })),
    )
}

async fn fake_backend() -> BackendClient {
    let app = Router::new()
        .route("/api/create-agent", post(create_agent))
        .route("/api/agents/:id", get(agent_status));
    let base_url = serve(app).await;
    BackendClient::new(base_url, Duration::from_secs(5)).unwrap()
}

fn submission(name: &str) -> AgentSubmission {
    AgentSubmission {
        name: name.to_string(),
        purpose: "Plans".to_string(),
        automation_steps: r#"[{"action":"llm_call","prompt":"plan"}]"#.to_string(),
    }
}

#[tokio::test]
async fn test_create_agent_accepted() {
    let client = fake_backend().await;
    let response = client.create_agent(&submission("Planner")).await.unwrap();

    assert_eq!(response.agent_id, 42);
    assert_eq!(response.status, "pending");
}

#[tokio::test]
async fn test_create_agent_rejection_carries_backend_error() {
    let client = fake_backend().await;
    let err = client.create_agent(&submission("")).await.unwrap_err();

    match &err {
        SubmitError::Rejected { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "Missing required fields");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(err.backend_message(), Some("Missing required fields"));
}

#[tokio::test]
async fn test_agent_status_lookup() {
    let client = fake_backend().await;

    let status = client.agent_status(42).await.unwrap();
    assert_eq!(status.name, "Planner");
    assert!(!status.is_finished());

    let missing = client.agent_status(7).await.unwrap_err();
    assert!(matches!(missing, SubmitError::NotFound(7)));
}

#[tokio::test]
async fn test_plain_text_error_body_is_kept() {
    let app = Router::new().route(
        "/api/create-agent",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable") }),
    );
    let client = BackendClient::new(serve(app).await, Duration::from_secs(5)).unwrap();

    let err = client.create_agent(&submission("Planner")).await.unwrap_err();
    match err {
        SubmitError::Rejected { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_undecodable_success_body() {
    let app = Router::new().route("/api/create-agent", post(|| async { "ok" }));
    let client = BackendClient::new(serve(app).await, Duration::from_secs(5)).unwrap();

    let err = client.create_agent(&submission("Planner")).await.unwrap_err();
    assert!(matches!(err, SubmitError::InvalidResponse(_)));
}
