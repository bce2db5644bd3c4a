//! Sequencing of loads, lead creation and optimistic stage moves.
//!
//! A move dispatches the optimistic update first, then makes exactly one
//! remote write. On success the move is confirmed and the pipeline reloaded
//! so server-side effects are picked up; on failure the optimistic update is
//! rolled back and the error returned for display. There is no automatic
//! retry. A second move of a lead while its first is unsettled is rejected.

use serde::Serialize;
use crate::models::{Lead, LeadFilter, NewLead};
use crate::pipeline::backend::PipelineBackend;
use crate::pipeline::error::PipelineError;
use crate::pipeline::idempotency::idempotency_key;
use crate::pipeline::state::{PipelineAction, PipelineStore};

/// One move attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveIntent {
    pub lead_id: String,
    pub from_stage_id: String,
    pub to_stage_id: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Destination equals the current stage; nothing was dispatched or sent
    Unchanged,
    Moved(MoveIntent),
}

pub struct MoveOrchestrator<'b, B: PipelineBackend + ?Sized> {
    backend: &'b B,
    filter: LeadFilter,
}

impl<'b, B: PipelineBackend + ?Sized> MoveOrchestrator<'b, B> {
    pub fn new(backend: &'b B) -> Self {
        Self { backend, filter: LeadFilter::default() }
    }

    /// Use `filter` for every load, including reloads after a move
    pub fn with_filter(mut self, filter: LeadFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Reload stages and leads. The outcome is also recorded in the store.
    pub fn load(&self, store: &mut PipelineStore) -> Result<(), PipelineError> {
        store.dispatch(PipelineAction::LoadStart);

        let fetched = self
            .backend
            .get_stages()
            .and_then(|stages| Ok((stages, self.backend.get_leads(&self.filter)?)));

        match fetched {
            Ok((stages, leads)) => {
                log::debug!(
                    "Loaded {} stages and {} leads (filter {})",
                    stages.len(),
                    leads.len(),
                    self.filter.as_string()
                );
                store.dispatch(PipelineAction::LoadSuccess { stages, leads });
                Ok(())
            }
            Err(e) => {
                let message = format!("{:#}", e);
                log::warn!("Pipeline load failed: {}", message);
                store.dispatch(PipelineAction::LoadError { message: message.clone() });
                Err(PipelineError::LoadFailed { message, source: e })
            }
        }
    }

    /// Create a lead and append it to the loaded pipeline
    pub fn create_lead(&self, store: &mut PipelineStore, fields: NewLead) -> Result<Lead, PipelineError> {
        validate_new_lead(&fields)?;

        let lead = self
            .backend
            .create_lead(&fields)
            .map_err(PipelineError::create_failed)?;
        store.dispatch(PipelineAction::CreateLead { lead: lead.clone() });
        Ok(lead)
    }

    /// Move a lead to another stage with an optimistic update
    pub fn move_lead(
        &self,
        store: &mut PipelineStore,
        lead_id: &str,
        to_stage_id: &str,
    ) -> Result<MoveOutcome, PipelineError> {
        let state = store.state();
        let lead = state
            .lead(lead_id)
            .ok_or_else(|| PipelineError::UnknownLead { lead_id: lead_id.to_string() })?;
        if state.stage(to_stage_id).is_none() {
            return Err(PipelineError::UnknownStage { stage_id: to_stage_id.to_string() });
        }
        if lead.stage_id == to_stage_id {
            return Ok(MoveOutcome::Unchanged);
        }
        if state.has_pending_move(lead_id) {
            return Err(PipelineError::MoveInFlight { lead_id: lead_id.to_string() });
        }

        let intent = MoveIntent {
            lead_id: lead_id.to_string(),
            from_stage_id: lead.stage_id.clone(),
            to_stage_id: to_stage_id.to_string(),
            idempotency_key: idempotency_key(lead_id, &lead.stage_id, to_stage_id),
        };

        store.dispatch(PipelineAction::MoveOptimistic {
            lead_id: intent.lead_id.clone(),
            to_stage_id: intent.to_stage_id.clone(),
        });

        match self
            .backend
            .move_lead_stage(&intent.lead_id, &intent.to_stage_id, &intent.idempotency_key)
        {
            Ok(()) => {
                store.dispatch(PipelineAction::MoveConfirmed { lead_id: intent.lead_id.clone() });
                // A failed reload is recorded in the store; the move itself stands
                if let Err(e) = self.load(store) {
                    log::warn!("Reload after move of lead {} failed: {}", intent.lead_id, e);
                }
                Ok(MoveOutcome::Moved(intent))
            }
            Err(e) => {
                log::warn!(
                    "Move of lead {} to {} failed, rolling back: {:#}",
                    intent.lead_id, intent.to_stage_id, e
                );
                store.dispatch(PipelineAction::MoveRollback {
                    lead_id: intent.lead_id.clone(),
                    from_stage_id: intent.from_stage_id.clone(),
                });
                Err(PipelineError::move_failed(intent.lead_id, e))
            }
        }
    }
}

fn validate_new_lead(fields: &NewLead) -> Result<(), PipelineError> {
    if fields.name.trim().is_empty() {
        return Err(PipelineError::InvalidLead { message: "name cannot be empty".to_string() });
    }
    if let Some(email) = fields.email.as_deref() {
        if !email.contains('@') {
            return Err(PipelineError::InvalidLead {
                message: format!("'{}' is not an email address", email),
            });
        }
    }
    Ok(())
}
