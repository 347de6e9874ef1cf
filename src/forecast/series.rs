use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

/// Width of every forecast window.
pub const WINDOW_SECS: i64 = 3 * 3600;

/// One forecast window `[window_start, window_start + 3h)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub window_start: DateTime<Utc>,
    pub temperature: f64,
    /// One-word condition, e.g. `Rain`.
    pub summary: String,
    /// Longer condition text, used as image alt text.
    pub description: String,
    pub icon: String,
}

impl ForecastPoint {
    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_start + TimeDelta::seconds(WINDOW_SECS)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.window_start <= instant && instant < self.window_end()
    }

    pub fn rounded_temperature(&self) -> i64 {
        // Saturating float-to-int cast; forecast temperatures are small.
        self.temperature.round() as i64
    }
}

/// Forecast windows in API order. Assumed non-overlapping and contiguous;
/// never re-sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    points: Vec<ForecastPoint>,
}

#[derive(Debug, Deserialize)]
struct OwmDocument {
    #[serde(default)]
    list: Vec<OwmEntry>,
}

#[derive(Debug, Deserialize)]
struct OwmEntry {
    dt: i64,
    main: OwmMain,
    #[serde(default)]
    weather: Vec<OwmCondition>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

impl ForecastSeries {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    /// Decode an OpenWeatherMap `forecast` document. Entries without a
    /// weather condition are dropped.
    pub fn from_openweather(body: &[u8]) -> Result<Self, serde_json::Error> {
        let document: OwmDocument = serde_json::from_slice(body)?;
        let points = document
            .list
            .into_iter()
            .filter_map(|entry| {
                let window_start = DateTime::from_timestamp(entry.dt, 0)?;
                let condition = entry.weather.into_iter().next()?;
                Some(ForecastPoint {
                    window_start,
                    temperature: entry.main.temp,
                    summary: condition.main,
                    description: condition.description,
                    icon: condition.icon,
                })
            })
            .collect();
        Ok(Self { points })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// First window containing `instant`, if any.
    pub fn point_at(&self, instant: DateTime<Utc>) -> Option<&ForecastPoint> {
        self.points.iter().find(|point| point.contains(instant))
    }
}
