//! Sequenced remote calls for one invocation.

pub mod attach;
pub mod orchestrator;

pub use attach::{AttachFailure, AttachOutcome, AttachPipeline, AttachState};
pub use orchestrator::Orchestrator;
