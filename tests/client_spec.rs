use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;
use tokio_test::assert_ok;
use workshop::api::{create_router_with_config, SecurityConfig};
use workshop::client::{ClientError, Poller, WorkshopClient};
use workshop::models::*;
use workshop::store::{Document, Store};

/// Serve the API on an ephemeral port and return its base URL.
async fn spawn_server(security: SecurityConfig) -> (String, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let app = create_router_with_config(Store::open(dir.path()), security);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    (format!("http://{}", addr), dir)
}

#[tokio::test]
async fn health_reports_ok() {
    let (url, _dir) = spawn_server(SecurityConfig::disabled()).await;
    let client = WorkshopClient::new(url, None);

    let health = client.health().await.expect("Health check failed");
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn crud_through_the_client() {
    let (url, _dir) = spawn_server(SecurityConfig::disabled()).await;
    let client = WorkshopClient::new(url, None);

    let task: Task = assert_ok!(client.create::<Task>(&json!({ "title": "Client task" })).await);
    assert_eq!(task.status, TaskStatus::Todo);

    let updated: Task = assert_ok!(
        client
            .update::<Task>(&task.id, &json!({ "status": "in-progress" }))
            .await
    );
    assert_eq!(updated.status, TaskStatus::InProgress);

    let document = client.list::<Task>().await.expect("List failed");
    assert_eq!(document.records, vec![updated]);

    assert_ok!(client.delete::<Task>(&task.id).await);
    assert_ok!(client.delete::<Task>(&task.id).await);
    assert!(client.list::<Task>().await.unwrap().records.is_empty());
}

#[tokio::test]
async fn maps_error_statuses() {
    let (url, _dir) = spawn_server(SecurityConfig::disabled()).await;
    let client = WorkshopClient::new(url, None);

    let missing = client
        .update::<Note>("nope", &json!({ "content": "x" }))
        .await;
    assert!(matches!(missing, Err(ClientError::NotFound(msg)) if msg == "Note not found"));

    let invalid = client.create::<Idea>(&json!({ "category": "tweet" })).await;
    assert!(matches!(invalid, Err(ClientError::BadRequest(msg)) if msg == "content is required"));

    client
        .create::<Idea>(&json!({ "id": "i-1", "content": "one" }))
        .await
        .unwrap();
    let duplicate = client
        .create::<Idea>(&json!({ "id": "i-1", "content": "two" }))
        .await;
    assert!(matches!(duplicate, Err(ClientError::Conflict(_))));
}

#[tokio::test]
async fn sends_the_api_key() {
    let (url, _dir) = spawn_server(SecurityConfig::with_api_key("secret")).await;

    let anonymous = WorkshopClient::new(url.clone(), None);
    assert!(matches!(
        anonymous.list::<Draft>().await,
        Err(ClientError::Unauthorized)
    ));

    let authorized = WorkshopClient::new(url, Some("secret".to_string()));
    assert_ok!(authorized.list::<Draft>().await);
}

#[tokio::test]
async fn moves_the_bookmark_cursor() {
    let (url, _dir) = spawn_server(SecurityConfig::disabled()).await;
    let client = WorkshopClient::new(url, None);

    let cursor = client.set_bookmark_cursor(Some("500")).await.unwrap();
    assert_eq!(cursor.as_deref(), Some("500"));
    assert_eq!(client.list::<Learning>().await.unwrap().cursor(), Some("500"));

    let cursor = client.set_bookmark_cursor(None).await.unwrap();
    assert!(cursor.is_none());
    assert_eq!(client.list::<Learning>().await.unwrap().cursor(), None);
}

#[tokio::test]
async fn poller_sees_a_mutation_after_refetch() {
    let (url, _dir) = spawn_server(SecurityConfig::disabled()).await;
    let client = WorkshopClient::new(url, None);

    let poller = Poller::<Document<Note>>::collection_every(client.clone(), Duration::from_secs(3600));
    let mut updates = poller.subscribe();
    updates.changed().await.expect("Poller stopped");
    assert!(poller.snapshot().data.unwrap().records.is_empty());

    client
        .create::<Note>(&json!({ "content": "Fresh" }))
        .await
        .unwrap();
    poller.refetch().await;

    let state = poller.snapshot();
    assert!(!state.loading);
    assert!(state.error.is_none());
    assert_eq!(state.data.unwrap().records[0].title, "Fresh");
}

#[tokio::test]
async fn poller_records_an_unreachable_server() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let poller = Poller::health(WorkshopClient::new(url, None));
    let mut updates = poller.subscribe();
    updates.changed().await.expect("Poller stopped");

    let state = poller.snapshot();
    assert!(state.data.is_none());
    assert!(state.error.is_some());
    assert!(!state.loading);
}
