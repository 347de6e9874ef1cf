//! Idempotent "check, create metadata, fetch content, upload content"
//! sequence for attaching a payload to a target record.

use super::Orchestrator;
use crate::clients::{ApiResponse, AtomicCreate, ContentSource, Filter, ResourceApi};
use crate::config::{AttachmentConfig, DuplicateCheck};
use crate::error::{PipelineError, Stage};
use crate::event::Credential;
use crate::records::{ATTACHMENT, AttachmentRecord};

/// Fields an existing attachment must share with ours to count as a
/// previous run.
const UNIQUE_ON: &[&str] = &["related_object_uuid", "attachment_name"];

/// Progress of one run. `Skipped` and `Uploaded` are the success terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    Init,
    Checked,
    Skipped,
    MetadataCreated,
    IdentifierKnown,
    ContentFetched,
    Uploaded,
    Failed(Stage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachOutcome {
    /// A sentinel-named attachment already exists; nothing was written.
    AlreadyApplied,
    Uploaded { record_id: String },
}

impl AttachOutcome {
    pub fn state(&self) -> AttachState {
        match self {
            Self::AlreadyApplied => AttachState::Skipped,
            Self::Uploaded { .. } => AttachState::Uploaded,
        }
    }
}

/// Terminal failure. Once metadata exists it is never rolled back, so a
/// failure after `IdentifierKnown` reports the orphaned record.
#[derive(Debug)]
pub struct AttachFailure {
    pub error: PipelineError,
    pub orphan_record_id: Option<String>,
}

impl AttachFailure {
    pub fn stage(&self) -> Stage {
        self.error.stage()
    }

    pub fn state(&self) -> AttachState {
        AttachState::Failed(self.stage())
    }

    fn before_metadata(error: PipelineError) -> Self {
        Self {
            error,
            orphan_record_id: None,
        }
    }
}

pub struct AttachPipeline<'a> {
    resource: &'a dyn ResourceApi,
    content: &'a dyn ContentSource,
    config: &'a AttachmentConfig,
}

/// Whether metadata must still be created, or an existing record was found.
enum Check {
    Absent,
    Present,
    Created(ApiResponse),
}

impl<'a> AttachPipeline<'a> {
    pub fn new(
        resource: &'a dyn ResourceApi,
        content: &'a dyn ContentSource,
        config: &'a AttachmentConfig,
    ) -> Self {
        Self {
            resource,
            content,
            config,
        }
    }

    pub async fn run(
        &self,
        credential: &Credential,
        target_id: &str,
    ) -> Result<AttachOutcome, AttachFailure> {
        let orchestrator = Orchestrator::new(target_id);
        let mut state = AttachState::Init;
        let fields = [
            ("related_object", self.config.related_object.as_str()),
            ("related_object_uuid", target_id),
            ("attachment_name", self.config.sentinel_name.as_str()),
            ("file_type", self.config.file_type.as_str()),
        ];

        let check = self
            .check(&orchestrator, credential, &fields)
            .await
            .map_err(AttachFailure::before_metadata)?;
        advance(&mut state, AttachState::Checked, target_id);

        let created = match check {
            Check::Present => {
                advance(&mut state, AttachState::Skipped, target_id);
                return Ok(AttachOutcome::AlreadyApplied);
            }
            Check::Created(response) => response,
            Check::Absent => orchestrator
                .stage(
                    Stage::MetadataCreate,
                    self.resource.create(credential, ATTACHMENT, &fields),
                )
                .await
                .map_err(AttachFailure::before_metadata)?,
        };
        advance(&mut state, AttachState::MetadataCreated, target_id);

        let record_id = created.record_id.ok_or_else(|| {
            AttachFailure::before_metadata(orchestrator.contract(
                Stage::IdentifierMissing,
                "no x-record-uuid received in header",
            ))
        })?;
        advance(&mut state, AttachState::IdentifierKnown, target_id);

        let orphaned = |error: PipelineError| AttachFailure {
            error,
            orphan_record_id: Some(record_id.clone()),
        };

        let payload = orchestrator
            .stage(
                Stage::ContentFetch,
                self.content.fetch_binary(&self.config.content_url),
            )
            .await
            .map_err(orphaned)?;
        advance(&mut state, AttachState::ContentFetched, target_id);

        orchestrator
            .stage(
                Stage::ContentUpload,
                self.resource
                    .upload_binary(credential, ATTACHMENT, &record_id, payload.body),
            )
            .await
            .map_err(orphaned)?;
        advance(&mut state, AttachState::Uploaded, target_id);

        Ok(AttachOutcome::Uploaded { record_id })
    }

    async fn check(
        &self,
        orchestrator: &Orchestrator,
        credential: &Credential,
        fields: &[(&str, &str)],
    ) -> Result<Check, PipelineError> {
        if self.config.duplicate_check == DuplicateCheck::Auto {
            let atomic = self
                .resource
                .create_if_absent(credential, ATTACHMENT, fields, UNIQUE_ON)
                .await;
            match atomic {
                Ok(AtomicCreate::Unsupported) => {}
                Ok(AtomicCreate::Exists) => return Ok(Check::Present),
                Ok(AtomicCreate::Created(response)) => {
                    let response = orchestrator
                        .stage(Stage::MetadataCreate, async move { Ok(response) })
                        .await?;
                    return Ok(Check::Created(response));
                }
                Err(error) => {
                    return orchestrator
                        .stage(Stage::MetadataCreate, async move { Err(error) })
                        .await
                        .map(Check::Created);
                }
            }
        }
        self.scan(orchestrator, credential).await
    }

    /// List-then-compare. Two racing runs can both see "absent".
    async fn scan(
        &self,
        orchestrator: &Orchestrator,
        credential: &Credential,
    ) -> Result<Check, PipelineError> {
        let filter = Filter::eq("related_object_uuid", orchestrator.target_id());
        let response = orchestrator
            .stage(
                Stage::ExistenceCheck,
                self.resource.list(credential, ATTACHMENT, &filter),
            )
            .await?;
        let existing: Vec<AttachmentRecord> = orchestrator.decode(Stage::ExistenceCheck, &response)?;
        let present = existing
            .iter()
            .any(|record| record.attachment_name == self.config.sentinel_name);
        Ok(if present { Check::Present } else { Check::Absent })
    }
}

fn advance(state: &mut AttachState, next: AttachState, target_id: &str) {
    tracing::debug!(target_id, from = ?*state, to = ?next, "attach transition");
    *state = next;
}
