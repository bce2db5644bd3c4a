use thiserror::Error;

/// Errors surfaced by the pipeline orchestrator.
///
/// Every variant is recoverable by user action; none should abort the
/// process. The `Display` text is what the user sees. Backend failures keep
/// their cause so callers can tell a database fault from a rejected request.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load pipeline: {message}")]
    LoadFailed {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Lead {lead_id} not found")]
    UnknownLead { lead_id: String },

    #[error("Stage {stage_id} not found")]
    UnknownStage { stage_id: String },

    #[error("A move for lead {lead_id} is still in progress")]
    MoveInFlight { lead_id: String },

    #[error("Failed to move lead {lead_id}: {message}")]
    MoveFailed {
        lead_id: String,
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid lead: {message}")]
    InvalidLead { message: String },

    #[error("Failed to create lead: {message}")]
    CreateFailed {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub(crate) fn move_failed(lead_id: String, source: anyhow::Error) -> Self {
        PipelineError::MoveFailed { lead_id, message: describe(&source), source }
    }

    pub(crate) fn create_failed(source: anyhow::Error) -> Self {
        PipelineError::CreateFailed { message: describe(&source), source }
    }

    /// Whether the failure came from the backend rather than from input
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            PipelineError::LoadFailed { .. }
                | PipelineError::MoveFailed { .. }
                | PipelineError::CreateFailed { .. }
        )
    }
}

/// Flatten an error chain into a single user-facing line
fn describe(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
