use super::AppState;
use crate::dispatch::{self, EventResponse};
use crate::event::Event;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};

/// GET /health
pub(super) async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /event: run one invocation and return its terminal response, or a
/// timeout response once `request_timeout` passes.
pub(super) async fn handle_event(
    State(state): State<AppState>,
    body: Result<Json<Event>, JsonRejection>,
) -> (StatusCode, Json<EventResponse>) {
    let Json(event) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::info!(error = %rejection.body_text(), "rejected event body");
            let status = match rejection.status() {
                StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
                _ => StatusCode::BAD_REQUEST,
            };
            return (
                status,
                Json(EventResponse::error(format!(
                    "Invalid event payload: {}",
                    rejection.body_text()
                ))),
            );
        }
    };

    tracing::info!(event = %event.name, "event received");
    let name = event.name.clone();
    let services = state.services.clone();
    // Spawned so a timed-out invocation still runs to completion instead of
    // being dropped between stages.
    let invocation = tokio::spawn(async move { dispatch::dispatch(&services, &event).await });

    let response = match tokio::time::timeout(state.request_timeout, invocation).await {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => {
            tracing::error!(event = %name, error = %error, "invocation task failed");
            EventResponse::html(format!("{error}\n\ninvocation of `{name}` did not complete"))
        }
        Err(_) => {
            tracing::warn!(
                event = %name,
                timeout = ?state.request_timeout,
                "invocation exceeded the gateway timeout"
            );
            dispatch::timed_out(&name, state.request_timeout)
        }
    };
    (StatusCode::OK, Json(response))
}
