use serde::{Deserialize, Serialize};

/// Unit systems the forecast API accepts for `units`.
pub const UNIT_SYSTEMS: &[&str] = &["metric", "imperial", "standard"];

/// Weather forecast API (OpenWeatherMap 5 day / 3 hour).
#[derive(Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key. Absent means the weather handler reports "not configured".
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_units")]
    pub units: String,
    /// Where `<icon>.png` weather icons are served from.
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,
}

fn default_base_url() -> String {
    "http://api.openweathermap.org".into()
}

fn default_units() -> String {
    "metric".into()
}

fn default_icon_base_url() -> String {
    "http://openweathermap.org/img/w".into()
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            units: default_units(),
            icon_base_url: default_icon_base_url(),
        }
    }
}

impl std::fmt::Debug for ForecastConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForecastConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("units", &self.units)
            .field("icon_base_url", &self.icon_base_url)
            .finish()
    }
}

impl ForecastConfig {
    /// Suffix for temperatures reported in the configured `units`.
    pub fn temperature_unit(&self) -> &'static str {
        match self.units.trim() {
            "imperial" => "°F",
            "standard" => "K",
            _ => "°C",
        }
    }

    /// The configured key, ignoring blanks and the placeholder shipped in
    /// sample configs.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != "your_api_key_goes_here")
    }
}
