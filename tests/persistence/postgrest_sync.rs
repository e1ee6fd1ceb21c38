use designsync::persistence::{
    FileStore, LocalStore, MemoryStore, PostgrestStore, RemoteStore, StateSync, SyncEvent,
    SyncObserver, SyncOptions,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_ID: &str = "designsync";

fn remote_for(server: &MockServer) -> Arc<dyn RemoteStore> {
    Arc::new(PostgrestStore::new(&server.uri(), "anon-key", "app_state"))
}

fn event_channel() -> (Arc<dyn SyncObserver>, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let observer: Arc<dyn SyncObserver> = Arc::new(move |event: &SyncEvent| {
        let name = match event {
            SyncEvent::LocalReadFailed { .. } => "local_read_failed",
            SyncEvent::LocalWriteFailed { .. } => "local_write_failed",
            SyncEvent::RemoteReadFailed { .. } => "remote_read_failed",
            SyncEvent::RemoteWriteSucceeded => "remote_write_succeeded",
            SyncEvent::RemoteWriteFailed { .. } => "remote_write_failed",
            SyncEvent::Migrated => "migrated",
            SyncEvent::MigrationFailed { .. } => "migration_failed",
        };
        let _ = tx.send(name.to_string());
    });
    (observer, rx)
}

async fn next_event(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for sync event")
        .expect("observer channel closed")
}

#[tokio::test]
async fn load_prefers_remote_and_warms_local_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/app_state"))
        .and(query_param("app_id", "eq.designsync"))
        .and(query_param("select", "state"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"state": {"theme": "luxury"}}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let local = Arc::new(FileStore::new(tmp.path()));
    local.set(APP_ID, &json!({"theme": "stale"})).unwrap();

    let sync = StateSync::new(
        APP_ID,
        local.clone(),
        remote_for(&server),
        SyncOptions::default(),
    );

    assert_eq!(sync.load().await, Some(json!({"theme": "luxury"})));
    assert_eq!(local.get(APP_ID).unwrap(), Some(json!({"theme": "luxury"})));

    sync.shutdown().await;
    server.verify().await;
}

#[tokio::test]
async fn local_only_state_is_migrated_to_remote() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/app_state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/app_state"))
        .and(query_param("on_conflict", "app_id"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let local = Arc::new(MemoryStore::new());
    local.set(APP_ID, &json!({"rooms": ["kitchen"]})).unwrap();
    let (observer, mut events) = event_channel();

    let sync = StateSync::new(
        APP_ID,
        local,
        remote_for(&server),
        SyncOptions {
            observer: Some(observer),
            ..SyncOptions::default()
        },
    );

    assert_eq!(sync.load().await, Some(json!({"rooms": ["kitchen"]})));
    assert_eq!(next_event(&mut events).await, "migrated");

    let received = server.received_requests().await.unwrap();
    let upsert = received
        .iter()
        .find(|request| request.method.as_str() == "POST")
        .unwrap();
    let row: Value = serde_json::from_slice(&upsert.body).unwrap();
    assert_eq!(row["app_id"], APP_ID);
    assert_eq!(row["state"], json!({"rooms": ["kitchen"]}));
    assert!(row["updated_at"].as_str().is_some());

    sync.shutdown().await;
    server.verify().await;
}

#[tokio::test]
async fn unreachable_remote_falls_back_to_local() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/app_state"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/app_state"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let local = Arc::new(MemoryStore::new());
    local.set(APP_ID, &json!({"step": 2})).unwrap();
    let (observer, mut events) = event_channel();

    let sync = StateSync::new(
        APP_ID,
        local,
        remote_for(&server),
        SyncOptions {
            observer: Some(observer),
            ..SyncOptions::default()
        },
    );

    assert_eq!(sync.load().await, Some(json!({"step": 2})));
    assert_eq!(next_event(&mut events).await, "remote_read_failed");
    assert_eq!(next_event(&mut events).await, "migration_failed");

    sync.shutdown().await;
}

#[tokio::test]
async fn burst_of_saves_reaches_remote_once_with_latest_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/app_state"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let local = Arc::new(MemoryStore::new());
    let (observer, mut events) = event_channel();
    let sync = StateSync::new(
        APP_ID,
        local.clone(),
        remote_for(&server),
        SyncOptions {
            debounce: Duration::from_millis(50),
            observer: Some(observer),
        },
    );

    for version in 1..=5 {
        sync.save(json!({"version": version}));
        assert_eq!(local.get(APP_ID).unwrap(), Some(json!({"version": version})));
    }

    assert_eq!(next_event(&mut events).await, "remote_write_succeeded");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let row: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(row["state"], json!({"version": 5}));
    let prefer = received[0].headers.get("prefer").unwrap().to_str().unwrap();
    assert!(prefer.contains("resolution=merge-duplicates"));

    sync.shutdown().await;
    server.verify().await;
}

#[tokio::test]
async fn shutdown_flushes_without_waiting_for_quiet_period() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/app_state"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let sync = StateSync::new(
        APP_ID,
        Arc::new(MemoryStore::new()),
        remote_for(&server),
        SyncOptions {
            debounce: Duration::from_secs(60),
            observer: None,
        },
    );

    sync.save(json!({"final": true}));
    tokio::time::timeout(Duration::from_secs(5), sync.shutdown())
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let row: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(row["state"], json!({"final": true}));
    server.verify().await;
}
