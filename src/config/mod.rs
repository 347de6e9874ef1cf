pub mod schema;

pub use schema::{
    AttachmentConfig, Config, DuplicateCheck, ForecastConfig, GatewayConfig, ObservabilityConfig,
    ResourceApiConfig,
};
