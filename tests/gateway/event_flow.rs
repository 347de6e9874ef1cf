use crate::gateway_harness::{GatewayTestServer, config_for, event};
use serde_json::json;
use wiremock::matchers::{body_bytes, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGO: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

async fn mount_logo(remote: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/images/servicem8_logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(LOGO))
        .mount(remote)
        .await;
}

async fn mount_attachment_list(remote: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api_1.0/Attachment.json"))
        .and(query_param("$filter", "related_object_uuid eq 'job-1'"))
        .and(header("authorization", "Bearer evt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(remote)
        .await;
}

fn webhook() -> serde_json::Value {
    event(
        "webhook_subscription",
        json!({"object": "Job", "entry": [{"uuid": "job-1", "changed_fields": ["status"]}]}),
    )
}

#[tokio::test]
async fn webhook_creates_metadata_then_uploads_content() {
    let remote = MockServer::start().await;
    mount_attachment_list(&remote, json!([])).await;
    mount_logo(&remote).await;
    Mock::given(method("POST"))
        .and(path("/api_1.0/Attachment.json"))
        .and(body_string_contains("related_object_uuid=job-1"))
        .and(body_string_contains("attachment_name=ServiceM8+Logo"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-record-uuid", "att-1")
                .set_body_string(r#"{"errorCode":0,"message":"OK"}"#),
        )
        .expect(1)
        .mount(&remote)
        .await;
    Mock::given(method("POST"))
        .and(path("/api_1.0/Attachment/att-1.file"))
        .and(body_bytes(LOGO))
        .and(header("authorization", "Bearer evt-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&remote)
        .await;

    let server = GatewayTestServer::start(config_for(&remote)).await;
    let response = server.invoke(&webhook()).await;
    assert_eq!(response, json!({"result": "Added attachment to job job-1"}));
}

#[tokio::test]
async fn webhook_skips_when_sentinel_exists() {
    let remote = MockServer::start().await;
    mount_attachment_list(
        &remote,
        json!([{"uuid": "att-0", "related_object_uuid": "job-1", "attachment_name": "ServiceM8 Logo"}]),
    )
    .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&remote)
        .await;

    let server = GatewayTestServer::start(config_for(&remote)).await;
    let response = server.invoke(&webhook()).await;
    assert_eq!(response, json!({"result": "Attachment already exists for job job-1"}));
}

#[tokio::test]
async fn webhook_upload_failure_is_error_response() {
    let remote = MockServer::start().await;
    mount_attachment_list(&remote, json!([])).await;
    mount_logo(&remote).await;
    Mock::given(method("POST"))
        .and(path("/api_1.0/Attachment.json"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-record-uuid", "att-2"))
        .mount(&remote)
        .await;
    Mock::given(method("POST"))
        .and(path("/api_1.0/Attachment/att-2.file"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
        .mount(&remote)
        .await;

    let server = GatewayTestServer::start(config_for(&remote)).await;
    let response = server.invoke(&webhook()).await;
    let error = response["error"].as_str().expect("error response");
    assert!(error.contains("uploading the attachment content"));
    assert!(error.contains("received HTTP 500\n\nstorage offline"));
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn pool_calculation_posts_note() {
    let job = "6f1c2b0e-3d4a-4b5c-8d9e-0a1b2c3d4e5f";
    let remote = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api_1.0/Note.json"))
        .and(body_string_contains(format!("related_object_uuid={job}")))
        .and(body_string_contains("related_object=job"))
        .respond_with(ResponseTemplate::new(200).insert_header("x-record-uuid", "note-1"))
        .expect(1)
        .mount(&remote)
        .await;

    let server = GatewayTestServer::start(config_for(&remote)).await;
    let response = server
        .invoke(&event(
            "pool_calc_calculate",
            json!({
                "job_uuid": job,
                "pool_volume_litres": "25000",
                "current_ph": "7.7",
                "desired_ph": "7.4"
            }),
        ))
        .await;
    let html = response["eventResponse"].as_str().expect("html response");
    assert!(html.starts_with("<h1>Add 0.75 units of Acid</h1>"));
    assert!(html.contains("Note has been posted to the Job Diary"));
}

#[tokio::test]
async fn unknown_event_returns_empty_object() {
    let remote = MockServer::start().await;
    let server = GatewayTestServer::start(config_for(&remote)).await;
    let response = server.invoke(&event("addon_installed", json!({}))).await;
    assert_eq!(response, json!({}));
}

#[tokio::test]
async fn non_event_body_is_bad_request() {
    let remote = MockServer::start().await;
    let server = GatewayTestServer::start(config_for(&remote)).await;
    let response = reqwest::Client::new()
        .post(server.url("/event"))
        .json(&json!({"hello": "world"}))
        .send()
        .await
        .expect("request should complete");
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("json body");
    assert!(body["error"].is_string());
}
