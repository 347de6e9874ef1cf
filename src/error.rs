use strum::{Display, IntoStaticStr};
use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `addonfn`.
///
/// Handlers match on [`PipelineError`] and [`ValidationError`] to decide what
/// the terminal response looks like; glue code (CLI, gateway bootstrap) keeps
/// using `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum AddonError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Remote call pipeline ────────────────────────────────────────────
    #[error("pipeline: {0}")]
    Pipeline(#[from] PipelineError),

    // ── Caller input ────────────────────────────────────────────────────
    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    // ── Response rendering ──────────────────────────────────────────────
    #[error("render: {0}")]
    Render(#[from] RenderError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Pipeline stages ─────────────────────────────────────────────────────────

/// Identity of one remote-call stage. Rendered kebab-case in logs and
/// terminal error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    JobRead,
    ActivityList,
    ForecastRead,
    ExistenceCheck,
    MetadataCreate,
    IdentifierMissing,
    ContentFetch,
    ContentUpload,
    NoteCreate,
}

impl Stage {
    /// Human phrasing used in rendered error messages.
    pub fn describe(self) -> &'static str {
        match self {
            Self::JobRead => "fetching the details",
            Self::ActivityList => "fetching scheduled bookings",
            Self::ForecastRead => "fetching the weather forecast",
            Self::ExistenceCheck => "querying attachment records",
            Self::MetadataCreate => "creating the attachment record",
            Self::IdentifierMissing => "reading the created record id",
            Self::ContentFetch => "downloading the attachment content",
            Self::ContentUpload => "uploading the attachment content",
            Self::NoteCreate => "posting the job note",
        }
    }
}

// ─── Pipeline errors ─────────────────────────────────────────────────────────

/// Terminal failure of a remote-call stage. Never retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The call never reached the remote, or no response came back.
    #[error("{stage} failed for {target_id}: transport error: {message}")]
    Transport {
        stage: Stage,
        target_id: String,
        message: String,
    },

    /// The remote answered with a non-success status.
    #[error("{stage} failed for {target_id}: received HTTP {status}\n\n{body}")]
    Status {
        stage: Stage,
        target_id: String,
        status: u16,
        body: String,
    },

    /// The remote reported success but the response broke its contract.
    #[error("{stage} failed for {target_id}: {detail}")]
    Contract {
        stage: Stage,
        target_id: String,
        detail: String,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Transport { stage, .. }
            | Self::Status { stage, .. }
            | Self::Contract { stage, .. } => *stage,
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            Self::Transport { target_id, .. }
            | Self::Status { target_id, .. }
            | Self::Contract { target_id, .. } => target_id,
        }
    }

    /// Raw diagnostic payload, without the stage/target prefix.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Transport { message, .. } => format!("transport error: {message}"),
            Self::Status { status, body, .. } => format!("received HTTP {status}\n\n{body}"),
            Self::Contract { detail, .. } => detail.clone(),
        }
    }
}

/// Failure of a remote call below the stage layer; the orchestrator tags it.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        // URLs may carry API keys in the query string.
        Self(error.without_url().to_string())
    }
}

// ─── Caller input errors ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing event argument `{0}`")]
    MissingArg(&'static str),

    #[error("event argument `{name}` is invalid: {reason}")]
    InvalidArg { name: &'static str, reason: String },

    #[error("malformed timestamp `{raw}`: {reason}")]
    Timestamp { raw: String, reason: String },
}

// ─── Render errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template render failed: {0}")]
    Template(#[from] tera::Error),

    #[error("json encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, AddonError>;
