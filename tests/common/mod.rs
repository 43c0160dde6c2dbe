//! Shared fixtures for the HTTP integration tests

use axo_tasks::ApiClient;
use serde_json::{json, Value};
use wiremock::MockServer;

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

pub fn mock_token() -> String {
    "eyJhbGciOiJIUzI1NiJ9.axo.signature".to_string()
}

/// Client pointed at the mock server with the test token attached.
pub fn authed_client(server: &MockServer) -> ApiClient {
    let mut client = ApiClient::new(&server.uri()).expect("client");
    client.set_token(mock_token());
    client
}

pub fn task_json(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Task {id}"),
        "description": "Write the release notes",
        "status": status,
        "priority": "high",
        "coins": 25,
        "due_date": "2024-06-30",
        "created_at": "2024-06-01T09:00:00.000Z",
        "updated_at": "2024-06-02T09:00:00.000Z",
        "user_id": 1,
        "project_id": 3,
        "user": {
            "id": 1,
            "name": "Ana Lima",
            "email": "ana@example.com",
            "profile_picture": null
        }
    })
}

pub fn user_json(coins: i64) -> Value {
    json!({
        "id": 1,
        "email": "ana@example.com",
        "name": "Ana Lima",
        "profile_picture": null,
        "coins": coins
    })
}
