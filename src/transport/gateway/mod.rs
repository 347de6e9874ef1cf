//! Axum-based HTTP front end for event invocations, with body limits and
//! a per-invocation time bound that still answers with an event response.

mod handlers;
mod server;

pub use server::{build_app, run_gateway, run_gateway_with_listener};

use crate::dispatch::Services;
use std::time::Duration;

/// Maximum request body size (64KB) -- prevents memory exhaustion
pub const MAX_BODY_SIZE: usize = 65_536;
/// Default invocation timeout (30s); `[gateway] request_timeout_secs` overrides it
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub request_timeout: Duration,
}
