use crate::gateway_harness::{GatewayTestServer, config_for, event};
use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn acst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600 + 30 * 60).unwrap()
}

/// Tomorrow at 07:00 in +09:30, as the API would send it.
fn booking_start() -> DateTime<FixedOffset> {
    (Utc::now() + Duration::days(1))
        .with_timezone(&acst())
        .with_hour(7)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap()
}

async fn mount_job(remote: &MockServer, geo_is_valid: &str) {
    Mock::given(method("GET"))
        .and(path("/api_1.0/Job/job-1.json"))
        .and(header("authorization", "Bearer evt-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uuid": "job-1",
            "lat": "-34.9285",
            "lng": "138.6007",
            "geo_is_valid": geo_is_valid,
            "generated_job_id": "1042"
        })))
        .mount(remote)
        .await;
}

#[tokio::test]
async fn weather_page_shows_booking_in_its_own_timezone() {
    let remote = MockServer::start().await;
    mount_job(&remote, "1").await;

    let start = booking_start();
    Mock::given(method("GET"))
        .and(path("/api_1.0/JobActivity.json"))
        .and(query_param("$filter", "job_uuid eq 'job-1'"))
        .and(header("sm-date-format", "ISO8601"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "uuid": "act-1",
                "job_uuid": "job-1",
                "start_date": start.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
                "active": "1",
                "activity_was_scheduled": "1"
            },
            {
                "uuid": "act-2",
                "job_uuid": "job-1",
                "start_date": start.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
                "active": "0",
                "activity_was_scheduled": "1"
            }
        ])))
        .expect(1)
        .mount(&remote)
        .await;

    let window_start = start.timestamp() - 3600;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("APPID", "owm-test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "list": [{
                "dt": window_start,
                "main": {"temp": 23.4},
                "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}]
            }]
        })))
        .expect(1)
        .mount(&remote)
        .await;

    let server = GatewayTestServer::start(config_for(&remote)).await;
    let response = server
        .invoke(&event("show_weather_info", json!({"jobUUID": "job-1"})))
        .await;
    let html = response["eventResponse"].as_str().expect("html response");

    let label = start.format("%A, %B %-d, %I:%M %p").to_string();
    assert!(html.contains("Scheduled Bookings for Job #1042"));
    assert!(html.contains(&format!("<h3>{label}</h3>")), "{html}");
    assert!(html.contains("07:00 AM"));
    assert!(html.contains("23°C</span>Clear"));
    assert_eq!(html.matches("<h3>").count(), 1);
}

#[tokio::test]
async fn weather_without_location_stops_early() {
    let remote = MockServer::start().await;
    mount_job(&remote, "0").await;
    Mock::given(method("GET"))
        .and(path("/api_1.0/JobActivity.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&remote)
        .await;

    let server = GatewayTestServer::start(config_for(&remote)).await;
    let response = server
        .invoke(&event("show_weather_info", json!({"jobUUID": "job-1"})))
        .await;
    let html = response["eventResponse"].as_str().expect("html response");
    assert!(html.contains("no location information for this job"));
}

#[tokio::test]
async fn weather_without_api_key_reports_configuration() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&remote)
        .await;

    let mut config = config_for(&remote);
    config.forecast.api_key = None;
    let server = GatewayTestServer::start(config).await;
    let response = server
        .invoke(&event("show_weather_info", json!({"jobUUID": "job-1"})))
        .await;
    let html = response["eventResponse"].as_str().expect("html response");
    assert!(html.contains("is not configured."));
}
