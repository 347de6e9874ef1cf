//! Event routing and the terminal response boundary.

use crate::clients::{
    ContentSource, ForecastApi, HttpContentSource, HttpResourceApi, OpenWeatherMapClient,
    ResourceApi,
};
use crate::clock::{Clock, SystemClock};
use crate::config::{AttachmentConfig, Config};
use crate::error::AddonError;
use crate::event::{Event, EventKind};
use crate::handlers;
use crate::render::{Notice, Renderer};
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// The one value an invocation produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventResponse {
    Html {
        #[serde(rename = "eventResponse")]
        event_response: String,
    },
    Result {
        result: String,
    },
    Error {
        error: String,
    },
    /// Answer to events nobody here handles.
    Empty {},
}

impl EventResponse {
    pub fn html(body: impl Into<String>) -> Self {
        Self::Html {
            event_response: body.into(),
        }
    }

    pub fn result(message: impl Into<String>) -> Self {
        Self::Result {
            result: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn empty() -> Self {
        Self::Empty {}
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// Collaborators shared by every invocation. Holds no per-invocation state.
#[derive(Clone)]
pub struct Services {
    pub resource: Arc<dyn ResourceApi>,
    /// `None` when no forecast API key is configured.
    pub forecast: Option<Arc<dyn ForecastApi>>,
    pub content: Arc<dyn ContentSource>,
    pub clock: Arc<dyn Clock>,
    pub renderer: Arc<Renderer>,
    pub attachment: AttachmentConfig,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self, AddonError> {
        let forecast = config.forecast.usable_api_key().map(|key| {
            Arc::new(OpenWeatherMapClient::new(
                &config.forecast.base_url,
                key,
                &config.forecast.units,
            )) as Arc<dyn ForecastApi>
        });
        if forecast.is_none() {
            tracing::warn!("forecast.api_key is not set; show_weather_info will report it");
        }

        Ok(Self {
            resource: Arc::new(HttpResourceApi::new(
                &config.resource_api.base_url,
                &config.resource_api.date_format,
            )),
            forecast,
            content: Arc::new(HttpContentSource::default()),
            clock: Arc::new(SystemClock),
            renderer: Arc::new(Renderer::new(
                &config.forecast.icon_base_url,
                config.forecast.temperature_unit(),
            )?),
            attachment: config.attachment.clone(),
        })
    }
}

/// Whether `event_name` answers with `{result}`/`{error}` rather than a page.
fn answers_with_result(event_name: &str) -> bool {
    event_name == handlers::attachment::EVENT_NAME
}

/// Terminal response for an invocation still running after `limit`. The
/// invocation itself is not cancelled.
pub fn timed_out(event_name: &str, limit: Duration) -> EventResponse {
    let message =
        format!("`{event_name}` did not finish within {limit:?} and continues in the background");
    if answers_with_result(event_name) {
        EventResponse::error(message)
    } else {
        EventResponse::html(message)
    }
}

/// Route `event` to its handler and always produce a response.
pub async fn dispatch(services: &Services, event: &Event) -> EventResponse {
    guard(&event.name, route(services, event)).await
}

/// Outermost boundary: handler errors and panics become an `eventResponse`
/// carrying the message and its trace.
async fn guard<F>(event_name: &str, handler: F) -> EventResponse
where
    F: Future<Output = anyhow::Result<EventResponse>>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(Ok(response)) => response,
        Ok(Err(error)) => {
            tracing::error!(event = %event_name, error = %error, "handler failed");
            EventResponse::html(format!("{error}\n\n{error:?}"))
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "handler panicked".to_string());
            tracing::error!(event = %event_name, panic = %message, "handler panicked");
            EventResponse::html(format!("{message}\n\npanicked while handling `{event_name}`"))
        }
    }
}

async fn route(services: &Services, event: &Event) -> anyhow::Result<EventResponse> {
    let credential = event.credential();
    let kind = match EventKind::from_event(event) {
        Ok(kind) => kind,
        Err(error) => {
            tracing::info!(event = %event.name, error = %error, "rejected event arguments");
            if answers_with_result(&event.name) {
                return Ok(EventResponse::error(error.to_string()));
            }
            let page = services.renderer.notice(
                &Notice::new("This add-on could not read the request.").with_detail(error.to_string()),
            )?;
            return Ok(EventResponse::html(page));
        }
    };
    tracing::debug!(event = %event.name, "dispatching");

    let response = match kind {
        EventKind::ShowWeatherInfo { job_uuid } => {
            handlers::weather::show_weather_info(services, credential, &job_uuid).await?
        }
        EventKind::WebhookSubscription { job_uuid } => {
            handlers::attachment::webhook_subscription(services, credential, &job_uuid).await
        }
        EventKind::PoolCalcStart { job_uuid } => handlers::pool::start(services, &job_uuid)?,
        EventKind::PoolCalcCalculate(args) => {
            handlers::pool::calculate(services, credential, &args).await?
        }
        EventKind::ShowcaseMainMenu { job_uuid } => {
            handlers::showcase::main_menu(services, event, &job_uuid)?
        }
        EventKind::RequestJobData { job_uuid } => {
            handlers::showcase::request_job_data(services, credential, &job_uuid).await?
        }
        EventKind::HelloWorld { job_uuid } => handlers::hello::hello_world(services, &job_uuid)?,
        EventKind::Unknown(name) => {
            tracing::debug!(event = %name, "no handler for event");
            EventResponse::empty()
        }
    };
    Ok(response)
}
