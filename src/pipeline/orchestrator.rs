use crate::clients::ApiResponse;
use crate::error::{PipelineError, Stage, TransportError};
use serde::de::DeserializeOwned;

/// Runs one invocation's remote calls as tagged stages. Callers chain
/// [`Orchestrator::stage`] with `?`, so the first failing stage ends the
/// sequence. Nothing is retried.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    target_id: String,
}

impl Orchestrator {
    pub fn new(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Await `call`; transport failures and non-2xx statuses become a
    /// [`PipelineError`] tagged with `stage`.
    pub async fn stage<F>(&self, stage: Stage, call: F) -> Result<ApiResponse, PipelineError>
    where
        F: Future<Output = Result<ApiResponse, TransportError>>,
    {
        tracing::debug!(%stage, target_id = %self.target_id, "stage start");
        match call.await {
            Ok(response) if response.is_success() => {
                tracing::debug!(
                    %stage,
                    target_id = %self.target_id,
                    status = response.status,
                    "stage ok"
                );
                Ok(response)
            }
            Ok(response) => {
                tracing::warn!(
                    %stage,
                    target_id = %self.target_id,
                    status = response.status,
                    "stage rejected"
                );
                Err(PipelineError::Status {
                    stage,
                    target_id: self.target_id.clone(),
                    status: response.status,
                    body: response.diagnostic(),
                })
            }
            Err(TransportError(message)) => {
                tracing::warn!(%stage, target_id = %self.target_id, error = %message, "stage transport failure");
                Err(PipelineError::Transport {
                    stage,
                    target_id: self.target_id.clone(),
                    message,
                })
            }
        }
    }

    /// Decode a successful response body; an undecodable body breaks the
    /// stage's contract.
    pub fn decode<T: DeserializeOwned>(
        &self,
        stage: Stage,
        response: &ApiResponse,
    ) -> Result<T, PipelineError> {
        response.json().map_err(|e| self.contract(stage, format!("undecodable response: {e}")))
    }

    pub fn contract(&self, stage: Stage, detail: impl Into<String>) -> PipelineError {
        PipelineError::Contract {
            stage,
            target_id: self.target_id.clone(),
            detail: detail.into(),
        }
    }
}
