#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::unnecessary_literal_bound,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod clients;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod forecast;
pub mod handlers;
pub mod pipeline;
pub mod records;
pub mod render;
pub mod transport;

pub use config::Config;
pub use dispatch::{EventResponse, Services, dispatch};
pub use error::{AddonError, PipelineError, Stage, ValidationError};
pub use event::{Event, EventKind};
