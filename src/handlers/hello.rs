use crate::dispatch::{EventResponse, Services};

/// Greeting page naming the open job.
pub fn hello_world(services: &Services, job_uuid: &str) -> anyhow::Result<EventResponse> {
    Ok(EventResponse::html(services.renderer.hello(job_uuid)?))
}
