use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;

use vox_api::config::Config;
use vox_api::gateway::directory::SessionDirectory;
use vox_api::gateway::fanout::VoteBroadcast;
use vox_api::store::MemoryStore;
use vox_api::AppState;

/// Build an AppState backed by a fresh in-memory store.
pub fn test_state() -> AppState {
    AppState {
        store: Arc::new(MemoryStore::new()),
        config: Arc::new(Config {
            port: 0,
            frontend_url: None,
        }),
        directory: Arc::new(SessionDirectory::new()),
        broadcast: Arc::new(VoteBroadcast::new()),
    }
}

/// Router + state for HTTP tests.
pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    (vox_api::routes::router().with_state(state.clone()), state)
}

/// Create a user through the API and return its id.
pub async fn create_user(server: &TestServer, name: &str) -> String {
    let resp = server
        .post("/api/v1/users")
        .json(&serde_json::json!({
            "name": name,
            "email": format!("{name}@vox.test"),
        }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = resp.json();
    body["id"].as_str().expect("user id").to_string()
}

/// Create a group through the API and return its id.
pub async fn create_group(
    server: &TestServer,
    name: &str,
    owner: &str,
    parent: Option<&str>,
) -> String {
    let mut body = serde_json::json!({ "name": name, "owner": owner });
    if let Some(parent) = parent {
        body["parent"] = serde_json::json!(parent);
    }

    let resp = server.post("/api/v1/groups").json(&body).await;
    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = resp.json();
    body["id"].as_str().expect("group id").to_string()
}

/// Create a participant through the API and return its id.
pub async fn create_participant(server: &TestServer, name: &str, group: &str) -> String {
    let resp = server
        .post("/api/v1/participants")
        .json(&serde_json::json!({ "name": name, "group": group }))
        .await;
    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = resp.json();
    body["id"].as_str().expect("participant id").to_string()
}
