mod attachment;
mod core;
mod forecast;
mod gateway;
mod observability;
mod resource;

pub use attachment::{AttachmentConfig, DuplicateCheck};
pub use core::Config;
pub use forecast::ForecastConfig;
pub use gateway::GatewayConfig;
pub use observability::ObservabilityConfig;
pub use resource::ResourceApiConfig;
