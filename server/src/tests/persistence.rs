use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use geonear_core::{load_directory, UserDirectory};
use serde_json::json;

use super::{json_body, register, request_as, send, set_location, test_config};
use crate::build_app;
use crate::config::AppConfig;
use crate::state::AppState;

fn persistent_config(prefix: &str) -> (PathBuf, AppConfig) {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock must be monotonic")
        .as_nanos();
    let root = std::env::temp_dir().join(format!("geonear_server_{prefix}_{timestamp}"));

    let mut config = test_config();
    config.persistence_enabled = true;
    config.snapshot_path = root.join("snapshot.json");
    config.wal_path = root.join("wal.jsonl");
    (root, config)
}

fn cleanup(root: &Path) {
    if root.exists() {
        fs::remove_dir_all(root).expect("temp directory should be removable");
    }
}

#[tokio::test]
async fn mutations_survive_restart() {
    let (root, config) = persistent_config("restart");
    let app = build_app(AppState::with_directory(config.clone(), UserDirectory::new()));

    register(&app, 1).await;
    register(&app, 2).await;
    assert_eq!(set_location(&app, 1, 50.0, 50.0).await.status(), StatusCode::CREATED);
    assert_eq!(set_location(&app, 2, 49.9, 50.05).await.status(), StatusCode::CREATED);
    let profile = send(
        &app,
        request_as(
            "PUT",
            "/users/me/profile",
            Some(2),
            Some(json!({"first_name": "Bo"})),
        ),
    )
    .await;
    assert_eq!(profile.status(), StatusCode::CREATED);

    let restored = load_directory(&config.snapshot_path, &config.wal_path)
        .expect("persisted state must load");
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.located_len(), 2);

    let restarted = build_app(AppState::with_directory(config.clone(), restored));
    let response = send(&restarted, request_as("GET", "/users?distance=20", Some(1), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["results"][0]["profile"]["first_name"], "Bo");

    cleanup(&root);
}

#[tokio::test]
async fn rejected_mutation_is_not_persisted() {
    let (root, config) = persistent_config("rejected");
    let app = build_app(AppState::with_directory(config.clone(), UserDirectory::new()));

    register(&app, 1).await;
    assert_eq!(
        set_location(&app, 1, 95.0, 0.0).await.status(),
        StatusCode::BAD_REQUEST
    );

    let restored = load_directory(&config.snapshot_path, &config.wal_path)
        .expect("persisted state must load");
    assert_eq!(restored.len(), 1);
    assert_eq!(restored.located_len(), 0);

    cleanup(&root);
}

#[tokio::test]
async fn wal_failure_keeps_memory_unchanged_and_marks_not_ready() {
    let (root, config) = persistent_config("wal_failure");
    // a directory at the wal path makes every append fail
    fs::create_dir_all(&config.wal_path).expect("blocking directory must be created");
    let app = build_app(AppState::with_directory(config, UserDirectory::new()));

    let response = send(
        &app,
        request_as(
            "POST",
            "/users",
            None,
            Some(json!({"id": 1, "username": "ada", "email": "ada@example.com"})),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let lookup = send(&app, request_as("GET", "/users/1", None, None)).await;
    assert_eq!(lookup.status(), StatusCode::NOT_FOUND);

    let ready = send(&app, request_as("GET", "/ready", None, None)).await;
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);

    cleanup(&root);
}
