use serde::{Deserialize, Serialize};

/// How the attachment pipeline suppresses duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateCheck {
    /// Atomic create-if-absent when the resource API offers it, scan otherwise.
    #[default]
    Auto,
    /// Always list-then-create (best effort).
    Scan,
}

/// The attachment added to a job on `webhook_subscription`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentConfig {
    /// Sentinel `attachment_name` used to detect a previous run.
    #[serde(default = "default_sentinel_name")]
    pub sentinel_name: String,
    #[serde(default = "default_file_type")]
    pub file_type: String,
    #[serde(default = "default_related_object")]
    pub related_object: String,
    /// Locator of the binary payload to attach.
    #[serde(default = "default_content_url")]
    pub content_url: String,
    #[serde(default)]
    pub duplicate_check: DuplicateCheck,
}

fn default_sentinel_name() -> String {
    "ServiceM8 Logo".into()
}

fn default_file_type() -> String {
    ".png".into()
}

fn default_related_object() -> String {
    "job".into()
}

fn default_content_url() -> String {
    "https://www.servicem8.com/images/servicem8_logo.png".into()
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self {
            sentinel_name: default_sentinel_name(),
            file_type: default_file_type(),
            related_object: default_related_object(),
            content_url: default_content_url(),
            duplicate_check: DuplicateCheck::default(),
        }
    }
}
