//! Showcase menu and the job data it loads on demand.

use crate::dispatch::{EventResponse, Services};
use crate::error::Stage;
use crate::event::{Credential, Event};
use crate::pipeline::Orchestrator;
use crate::records::JOB;

/// `showcase_main_menu`: menu page with the triggering event dumped for
/// inspection. The credential serializes redacted.
pub fn main_menu(services: &Services, event: &Event, job_uuid: &str) -> anyhow::Result<EventResponse> {
    let event_json = serde_json::to_string_pretty(event)?;
    Ok(EventResponse::html(
        services.renderer.showcase(job_uuid, &event_json)?,
    ))
}

/// `request_job_data_event`: the job record, pretty-printed.
pub async fn request_job_data(
    services: &Services,
    credential: &Credential,
    job_uuid: &str,
) -> anyhow::Result<EventResponse> {
    let orchestrator = Orchestrator::new(job_uuid);
    let job = async {
        let response = orchestrator
            .stage(
                Stage::JobRead,
                services.resource.read_one(credential, JOB, job_uuid),
            )
            .await?;
        orchestrator.decode::<serde_json::Value>(Stage::JobRead, &response)
    }
    .await;

    match job {
        Ok(job) => Ok(EventResponse::html(serde_json::to_string_pretty(&job)?)),
        Err(error) => Ok(EventResponse::error(format!(
            "Unable to retrieve job [{job_uuid}] [{}]",
            error.diagnostic()
        ))),
    }
}
