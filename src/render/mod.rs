//! HTML and text responses rendered through Tera.

pub mod engine;

pub use engine::TeraEngine;

use crate::error::RenderError;
use crate::forecast::BookingForecast;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("shell.html", include_str!("templates/shell.html")),
    ("notice.html", include_str!("templates/notice.html")),
    ("weather.html", include_str!("templates/weather.html")),
    ("pool_form.html", include_str!("templates/pool_form.html")),
    ("pool_result.html", include_str!("templates/pool_result.html")),
    ("showcase.html", include_str!("templates/showcase.html")),
    ("hello.html", include_str!("templates/hello.html")),
];

/// Informational page: an optional bold lead, a sentence and optional
/// preformatted detail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Notice {
    pub lead: Option<String>,
    pub message: String,
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_lead(mut self, lead: impl Into<String>) -> Self {
        self.lead = Some(lead.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct WeatherSnippet {
    icon_url: String,
    description: String,
    temperature: i64,
    summary: String,
}

#[derive(Debug, Serialize)]
struct BookingView {
    label: String,
    forecast: Option<WeatherSnippet>,
}

#[derive(Debug, Serialize)]
struct WeatherView<'a> {
    job_number: String,
    temperature_unit: &'a str,
    bookings: Vec<BookingView>,
}

#[derive(Debug, Serialize)]
struct PoolFormView<'a> {
    job_uuid: &'a str,
    volume: &'a str,
    current_ph: &'a str,
    desired_ph: &'a str,
}

/// Whether the calculation's diary note made it.
#[derive(Debug, Clone, Serialize)]
pub struct NoteStatus {
    pub posted: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
struct PoolResultView<'a> {
    headline: &'a str,
    note: Option<&'a NoteStatus>,
}

#[derive(Debug, Serialize)]
struct JobView<'a> {
    job_uuid: &'a str,
}

#[derive(Debug, Serialize)]
struct ShowcaseView<'a> {
    job_uuid: &'a str,
    event_json: &'a str,
}

/// Typed front end over the bundled templates.
pub struct Renderer {
    engine: TeraEngine,
    icon_base_url: String,
    temperature_unit: String,
}

impl Renderer {
    /// `temperature_unit` is the suffix shown after forecast temperatures,
    /// matching the units the forecast API was asked for.
    pub fn new(icon_base_url: &str, temperature_unit: &str) -> Result<Self, RenderError> {
        Ok(Self {
            engine: TeraEngine::with_templates(TEMPLATES)?,
            icon_base_url: icon_base_url.trim_end_matches('/').to_string(),
            temperature_unit: temperature_unit.to_string(),
        })
    }

    pub fn notice(&self, notice: &Notice) -> Result<String, RenderError> {
        self.engine.render_view("notice.html", notice)
    }

    /// Booking list with per-booking forecast, or the "no bookings" page
    /// when `bookings` is empty.
    pub fn weather(
        &self,
        job_number: &str,
        bookings: &[BookingForecast],
    ) -> Result<String, RenderError> {
        let view = WeatherView {
            job_number: job_number.to_string(),
            temperature_unit: &self.temperature_unit,
            bookings: bookings
                .iter()
                .map(|booking| BookingView {
                    label: booking.local_label.clone(),
                    forecast: booking.forecast.as_ref().map(|point| WeatherSnippet {
                        icon_url: format!("{}/{}.png", self.icon_base_url, point.icon),
                        description: point.description.clone(),
                        temperature: point.rounded_temperature(),
                        summary: point.summary.clone(),
                    }),
                })
                .collect(),
        };
        self.engine.render_view("weather.html", &view)
    }

    pub fn pool_form(
        &self,
        job_uuid: &str,
        volume: &str,
        current_ph: &str,
        desired_ph: &str,
    ) -> Result<String, RenderError> {
        self.engine.render_view(
            "pool_form.html",
            &PoolFormView {
                job_uuid,
                volume,
                current_ph,
                desired_ph,
            },
        )
    }

    /// Fragment injected into the open calculator form, not a full page.
    pub fn pool_result(
        &self,
        headline: &str,
        note: Option<&NoteStatus>,
    ) -> Result<String, RenderError> {
        self.engine
            .render_view("pool_result.html", &PoolResultView { headline, note })
    }

    pub fn showcase(&self, job_uuid: &str, event_json: &str) -> Result<String, RenderError> {
        self.engine.render_view(
            "showcase.html",
            &ShowcaseView {
                job_uuid,
                event_json,
            },
        )
    }

    pub fn hello(&self, job_uuid: &str) -> Result<String, RenderError> {
        self.engine.render_view("hello.html", &JobView { job_uuid })
    }
}
