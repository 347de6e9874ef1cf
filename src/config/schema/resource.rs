use serde::{Deserialize, Serialize};

/// Resource (job management) REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceApiConfig {
    /// Base URL, without trailing slash (default: `https://api.servicem8.com/api_1.0`)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `sm-date-format` header sent on list calls, so timestamps
    /// carry their timezone offset.
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_base_url() -> String {
    "https://api.servicem8.com/api_1.0".into()
}

fn default_date_format() -> String {
    "ISO8601".into()
}

impl Default for ResourceApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            date_format: default_date_format(),
        }
    }
}
