use addonfn::Config;
use addonfn::transport::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use wiremock::MockServer;

pub struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    pub async fn start(config: Config) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let config = Arc::new(config);
        let host = "127.0.0.1".to_string();
        let handle =
            tokio::spawn(async move { run_gateway_with_listener(&host, listener, config).await });

        wait_until_gateway_ready(port).await;

        Self { port, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    /// POST an event and return the JSON response body.
    pub async fn invoke(&self, event: &Value) -> Value {
        let response = reqwest::Client::new()
            .post(self.url("/event"))
            .json(event)
            .send()
            .await
            .expect("event request should complete");
        assert_eq!(response.status(), StatusCode::OK);
        response.json().await.expect("event response should be json")
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..80 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("gateway did not become ready on port {port}");
}

/// Config pointing every remote collaborator at `remote`.
pub fn config_for(remote: &MockServer) -> Config {
    let mut config = Config::default();
    config.resource_api.base_url = format!("{}/api_1.0", remote.uri());
    config.forecast.base_url = remote.uri();
    config.forecast.api_key = Some("owm-test-key".to_string());
    config.attachment.content_url = format!("{}/images/servicem8_logo.png", remote.uri());
    config
}

pub fn event(name: &str, args: Value) -> Value {
    serde_json::json!({
        "eventName": name,
        "eventArgs": args,
        "auth": {"accessToken": "evt-token"}
    })
}
