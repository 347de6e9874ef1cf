//! Weather forecast API: 5 day / 3 hour forecast for a coordinate.

use super::{ApiResponse, build_http_client};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::Client;

#[async_trait]
pub trait ForecastApi: Send + Sync {
    /// Raw forecast document for `lat`/`lng`; decoding is left to
    /// [`crate::forecast::ForecastSeries`].
    async fn read(&self, lat: f64, lng: f64) -> Result<ApiResponse, TransportError>;
}

pub struct OpenWeatherMapClient {
    base_url: String,
    api_key: String,
    units: String,
    client: Client,
}

impl OpenWeatherMapClient {
    pub fn new(base_url: &str, api_key: &str, units: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            units: units.to_string(),
            client: build_http_client(),
        }
    }

    fn forecast_url(&self) -> String {
        format!("{}/data/2.5/forecast", self.base_url)
    }
}

impl std::fmt::Debug for OpenWeatherMapClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ForecastApi for OpenWeatherMapClient {
    async fn read(&self, lat: f64, lng: f64) -> Result<ApiResponse, TransportError> {
        tracing::debug!(lat, lng, "forecast read");
        let response = self
            .client
            .get(self.forecast_url())
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lng.to_string()),
                ("mode", "json".to_string()),
                ("units", self.units.clone()),
                ("APPID", self.api_key.clone()),
            ])
            .send()
            .await?;
        ApiResponse::from_reqwest(response).await
    }
}
