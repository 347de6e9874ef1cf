//! `webhook_subscription`: attach the configured payload to a job once.

use crate::dispatch::{EventResponse, Services};
use crate::event::Credential;
use crate::pipeline::{AttachOutcome, AttachPipeline};

pub const EVENT_NAME: &str = "webhook_subscription";

pub async fn webhook_subscription(
    services: &Services,
    credential: &Credential,
    job_uuid: &str,
) -> EventResponse {
    let pipeline = AttachPipeline::new(
        services.resource.as_ref(),
        services.content.as_ref(),
        &services.attachment,
    );

    match pipeline.run(credential, job_uuid).await {
        Ok(AttachOutcome::AlreadyApplied) => {
            tracing::info!(target_id = job_uuid, "attachment already present");
            EventResponse::result(format!("Attachment already exists for job {job_uuid}"))
        }
        Ok(AttachOutcome::Uploaded { record_id }) => {
            tracing::info!(target_id = job_uuid, record_id = %record_id, "attachment added");
            EventResponse::result(format!("Added attachment to job {job_uuid}"))
        }
        Err(failure) => {
            let stage = failure.stage();
            match failure.orphan_record_id.as_deref() {
                Some(orphan) => tracing::warn!(
                    target_id = job_uuid,
                    %stage,
                    orphan_record_id = orphan,
                    "attachment left without content"
                ),
                None => tracing::warn!(target_id = job_uuid, %stage, "attachment failed"),
            }
            EventResponse::error(format!(
                "Error while {} for job {job_uuid}, {}",
                stage.describe(),
                failure.error.diagnostic()
            ))
        }
    }
}
