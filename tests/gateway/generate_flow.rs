use crate::gateway_harness::{generation_config, spawn_gateway};
use designsync::config::{GatewayConfig, GenerationConfig};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn generate_creates_polls_and_returns_urls() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predictions"))
        .and(header("authorization", "Token test-token"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "abc", "status": "starting"})),
        )
        .expect(1)
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/predictions/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "status": "succeeded",
            "output": {"images": ["https://cdn.example/1.png", "https://cdn.example/2.png"]},
        })))
        .mount(&upstream)
        .await;

    let gateway = spawn_gateway(
        &generation_config(&upstream.uri(), 5),
        &GatewayConfig::default(),
    )
    .await;

    let response = gateway
        .client
        .post(gateway.url("/api/generate"))
        .json(&json!({"imageBase64": "QUJD", "style": "Arabic majlis"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["id"], "abc");
    assert_eq!(body["style"], "Arabic majlis");
    assert_eq!(
        body["urls"],
        json!(["https://cdn.example/1.png", "https://cdn.example/2.png"])
    );

    let received = upstream.received_requests().await.unwrap();
    let create: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(create["version"], "test-version");
    assert_eq!(create["input"]["image"], "data:image/jpeg;base64,QUJD");
    assert!(
        create["input"]["prompt"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("arabic")
    );
    upstream.verify().await;
}

#[tokio::test]
async fn job_that_never_finishes_times_out_with_504() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predictions"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "slow", "status": "starting"})),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/predictions/slow"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "slow", "status": "processing"})),
        )
        .mount(&upstream)
        .await;

    let gateway = spawn_gateway(
        &generation_config(&upstream.uri(), 1),
        &GatewayConfig::default(),
    )
    .await;

    let response = gateway
        .client
        .post(gateway.url("/api/generate"))
        .json(&json!({"imageBase64": "QUJD"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 504);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({"ok": false, "step": "timeout", "error": "Replicate timeout"})
    );
}

#[tokio::test]
async fn failed_job_reports_upstream_error() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predictions"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": "bad", "status": "starting"})),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/predictions/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "bad",
            "status": "failed",
            "error": "CUDA out of memory",
        })))
        .mount(&upstream)
        .await;

    let gateway = spawn_gateway(
        &generation_config(&upstream.uri(), 5),
        &GatewayConfig::default(),
    )
    .await;

    let response = gateway
        .client
        .post(gateway.url("/api/generate"))
        .json(&json!({"imageBase64": "data:image/png;base64,QUJD"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["step"], "replicate_failed");
    assert_eq!(body["error"], "CUDA out of memory");
    assert_eq!(body["raw"]["status"], "failed");
}

#[tokio::test]
async fn rejected_create_surfaces_detail() {
    let upstream = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predictions"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"detail": "Invalid version"})),
        )
        .mount(&upstream)
        .await;

    let gateway = spawn_gateway(
        &generation_config(&upstream.uri(), 5),
        &GatewayConfig::default(),
    )
    .await;

    let response = gateway
        .client
        .post(gateway.url("/api/generate"))
        .json(&json!({"imageBase64": "QUJD"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["step"], "replicate_create");
    assert_eq!(body["error"], "Invalid version");
    assert_eq!(body["raw"], json!({"detail": "Invalid version"}));
}

#[tokio::test]
async fn missing_token_never_contacts_upstream() {
    let upstream = MockServer::start().await;
    let generation = GenerationConfig {
        api_base_url: upstream.uri(),
        ..GenerationConfig::default()
    };
    let gateway = spawn_gateway(&generation, &GatewayConfig::default()).await;

    let response = gateway
        .client
        .post(gateway.url("/api/generate"))
        .json(&json!({"imageBase64": "QUJD"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["step"], "env");
    assert!(upstream.received_requests().await.unwrap().is_empty());
}
