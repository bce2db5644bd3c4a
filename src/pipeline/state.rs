//! Pipeline view model and its reducer.
//!
//! `reduce` is a pure transition function: it never mutates its input and
//! cannot fail. Actions whose precondition does not hold return a state equal
//! to the input. `PipelineStore` owns the current state and applies actions
//! one at a time in dispatch order.

use std::collections::BTreeMap;
use serde::Serialize;
use crate::models::{sort_stages, Lead, Stage};

/// Coarse lifecycle of the pipeline view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineState {
    pub stages: Vec<Stage>,
    pub leads: Vec<Lead>,
    pub loading: bool,
    pub error: Option<String>,
    /// Optimistic moves not yet confirmed or rolled back: lead id -> stage it left
    pub pending_moves: BTreeMap<String, String>,
    #[serde(skip)]
    loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineAction {
    LoadStart,
    LoadSuccess { stages: Vec<Stage>, leads: Vec<Lead> },
    LoadError { message: String },
    CreateLead { lead: Lead },
    MoveOptimistic { lead_id: String, to_stage_id: String },
    MoveRollback { lead_id: String, from_stage_id: String },
    MoveConfirmed { lead_id: String },
}

impl PipelineAction {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineAction::LoadStart => "LOAD_START",
            PipelineAction::LoadSuccess { .. } => "LOAD_SUCCESS",
            PipelineAction::LoadError { .. } => "LOAD_ERROR",
            PipelineAction::CreateLead { .. } => "CREATE_LEAD",
            PipelineAction::MoveOptimistic { .. } => "MOVE_OPTIMISTIC",
            PipelineAction::MoveRollback { .. } => "MOVE_ROLLBACK",
            PipelineAction::MoveConfirmed { .. } => "MOVE_CONFIRMED",
        }
    }
}

impl PipelineState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Errored
        } else if self.loaded {
            Phase::Loaded
        } else {
            Phase::Idle
        }
    }

    pub fn lead(&self, id: &str) -> Option<&Lead> {
        self.leads.iter().find(|l| l.id == id)
    }

    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn leads_in_stage<'a>(&'a self, stage_id: &'a str) -> impl Iterator<Item = &'a Lead> + 'a {
        self.leads.iter().filter(move |l| l.stage_id == stage_id)
    }

    /// Stages in position order, minus those whose slug is hidden
    pub fn visible_stages(&self, hidden_slugs: &[String]) -> Vec<&Stage> {
        self.stages
            .iter()
            .filter(|s| {
                s.slug
                    .as_ref()
                    .map_or(true, |slug| !hidden_slugs.contains(slug))
            })
            .collect()
    }

    pub fn has_pending_move(&self, lead_id: &str) -> bool {
        self.pending_moves.contains_key(lead_id)
    }
}

/// Apply one action to a state, producing the next state
pub fn reduce(state: &PipelineState, action: &PipelineAction) -> PipelineState {
    let mut next = state.clone();
    match action {
        PipelineAction::LoadStart => {
            next.loading = true;
            next.error = None;
        }
        PipelineAction::LoadSuccess { stages, leads } => {
            next.stages = stages.clone();
            sort_stages(&mut next.stages);
            next.leads = leads.clone();
            next.loading = false;
            next.loaded = true;
            next.pending_moves.clear();
        }
        PipelineAction::LoadError { message } => {
            next.loading = false;
            next.error = Some(message.clone());
        }
        PipelineAction::CreateLead { lead } => {
            next.leads.push(lead.clone());
        }
        PipelineAction::MoveOptimistic { lead_id, to_stage_id } => {
            if let Some(lead) = next.leads.iter_mut().find(|l| &l.id == lead_id) {
                let from = std::mem::replace(&mut lead.stage_id, to_stage_id.clone());
                // Keep the original stage if a move was already pending
                next.pending_moves.entry(lead_id.clone()).or_insert(from);
            }
        }
        PipelineAction::MoveRollback { lead_id, from_stage_id } => {
            if next.pending_moves.remove(lead_id).is_some() {
                if let Some(lead) = next.leads.iter_mut().find(|l| &l.id == lead_id) {
                    lead.stage_id = from_stage_id.clone();
                }
            }
        }
        PipelineAction::MoveConfirmed { lead_id } => {
            next.pending_moves.remove(lead_id);
        }
    }
    next
}

/// Called after every dispatch with the action and the resulting state
pub type StoreListener = Box<dyn FnMut(&PipelineAction, &PipelineState)>;

/// Single owner of the pipeline state
#[derive(Default)]
pub struct PipelineStore {
    state: PipelineState,
    listeners: Vec<StoreListener>,
}

impl std::fmt::Debug for PipelineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineStore")
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PipelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Register a listener; listeners run in registration order
    pub fn subscribe(&mut self, listener: StoreListener) {
        self.listeners.push(listener);
    }

    pub fn dispatch(&mut self, action: PipelineAction) {
        log::trace!("dispatch {}", action.name());
        self.state = reduce(&self.state, &action);
        for listener in self.listeners.iter_mut() {
            listener(&action, &self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: &str, position: i64) -> Stage {
        Stage::new(id, id, position, None)
    }

    fn lead(id: &str, stage_id: &str) -> Lead {
        Lead {
            id: id.to_string(),
            name: format!("Lead {}", id),
            phone: None,
            email: None,
            stage_id: stage_id.to_string(),
            notes: String::new(),
            source: "test".to_string(),
            next_follow_up_ts: None,
            created_ts: 0,
            modified_ts: 0,
        }
    }

    fn loaded() -> PipelineState {
        let state = reduce(&PipelineState::default(), &PipelineAction::LoadStart);
        reduce(
            &state,
            &PipelineAction::LoadSuccess {
                stages: vec![stage("s1", 0), stage("s2", 1)],
                leads: vec![lead("l1", "s1"), lead("l2", "s2")],
            },
        )
    }

    fn stage_of<'a>(state: &'a PipelineState, lead_id: &str) -> &'a str {
        &state.lead(lead_id).unwrap().stage_id
    }

    #[test]
    fn test_load_start_clears_error() {
        let errored = reduce(
            &PipelineState::default(),
            &PipelineAction::LoadError { message: "boom".to_string() },
        );
        assert_eq!(errored.phase(), Phase::Errored);

        let next = reduce(&errored, &PipelineAction::LoadStart);
        assert!(next.loading);
        assert!(next.error.is_none());
        assert_eq!(next.phase(), Phase::Loading);
    }

    #[test]
    fn test_load_success_replaces_wholesale() {
        let state = loaded();
        let next = reduce(
            &state,
            &PipelineAction::LoadSuccess {
                stages: vec![stage("s9", 5)],
                leads: vec![lead("l9", "s9")],
            },
        );
        assert!(!next.loading);
        assert_eq!(next.stages.len(), 1);
        assert_eq!(next.leads.len(), 1);
        assert_eq!(next.leads[0].id, "l9");
        assert_eq!(next.phase(), Phase::Loaded);
    }

    #[test]
    fn test_load_success_sorts_stages() {
        let next = reduce(
            &PipelineState::default(),
            &PipelineAction::LoadSuccess {
                stages: vec![stage("b", 2), stage("a", 1)],
                leads: vec![],
            },
        );
        assert_eq!(next.stages[0].id, "a");
    }

    #[test]
    fn test_load_error_keeps_data() {
        let state = loaded();
        let next = reduce(
            &reduce(&state, &PipelineAction::LoadStart),
            &PipelineAction::LoadError { message: "offline".to_string() },
        );
        assert!(!next.loading);
        assert_eq!(next.error.as_deref(), Some("offline"));
        assert_eq!(next.leads, state.leads);
    }

    #[test]
    fn test_create_lead_appends() {
        let next = reduce(&loaded(), &PipelineAction::CreateLead { lead: lead("l3", "s1") });
        assert_eq!(next.leads.len(), 3);
        assert_eq!(next.leads[2].id, "l3");
    }

    #[test]
    fn test_optimistic_move_applies_immediately() {
        let next = reduce(
            &loaded(),
            &PipelineAction::MoveOptimistic {
                lead_id: "l1".to_string(),
                to_stage_id: "s2".to_string(),
            },
        );
        assert_eq!(stage_of(&next, "l1"), "s2");
        assert_eq!(next.pending_moves.get("l1").map(String::as_str), Some("s1"));
    }

    #[test]
    fn test_optimistic_move_then_rollback_restores_state() {
        let before = loaded();
        let moved = reduce(
            &before,
            &PipelineAction::MoveOptimistic {
                lead_id: "l1".to_string(),
                to_stage_id: "s2".to_string(),
            },
        );
        let rolled_back = reduce(
            &moved,
            &PipelineAction::MoveRollback {
                lead_id: "l1".to_string(),
                from_stage_id: "s1".to_string(),
            },
        );
        assert_eq!(stage_of(&rolled_back, "l1"), "s1");
        assert_eq!(rolled_back, before);
    }

    #[test]
    fn test_rollback_without_pending_move_is_ignored() {
        let state = loaded();
        let next = reduce(
            &state,
            &PipelineAction::MoveRollback {
                lead_id: "l1".to_string(),
                from_stage_id: "s2".to_string(),
            },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_optimistic_move_unknown_lead_is_ignored() {
        let state = loaded();
        let next = reduce(
            &state,
            &PipelineAction::MoveOptimistic {
                lead_id: "ghost".to_string(),
                to_stage_id: "s2".to_string(),
            },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_confirm_clears_pending_only() {
        let moved = reduce(
            &loaded(),
            &PipelineAction::MoveOptimistic {
                lead_id: "l1".to_string(),
                to_stage_id: "s2".to_string(),
            },
        );
        let confirmed = reduce(&moved, &PipelineAction::MoveConfirmed { lead_id: "l1".to_string() });
        assert!(!confirmed.has_pending_move("l1"));
        assert_eq!(stage_of(&confirmed, "l1"), "s2");
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let state = loaded();
        let snapshot = state.clone();
        let action = PipelineAction::MoveOptimistic {
            lead_id: "l1".to_string(),
            to_stage_id: "s2".to_string(),
        };
        let first = reduce(&state, &action);
        let second = reduce(&state, &action);
        assert_eq!(first, second);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_visible_stages_hides_slugs() {
        let state = reduce(
            &PipelineState::default(),
            &PipelineAction::LoadSuccess {
                stages: vec![
                    Stage::new("a", "A", 0, Some("new_contacts")),
                    Stage::new("b", "B", 1, Some("closed_lost")),
                    Stage::new("c", "C", 2, None),
                ],
                leads: vec![],
            },
        );
        let visible: Vec<&str> = state
            .visible_stages(&["closed_lost".to_string()])
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(visible, vec!["a", "c"]);
    }

    #[test]
    fn test_store_applies_in_order() {
        let mut store = PipelineStore::new();
        assert_eq!(store.state().phase(), Phase::Idle);
        store.dispatch(PipelineAction::LoadStart);
        store.dispatch(PipelineAction::LoadSuccess {
            stages: vec![stage("s1", 0)],
            leads: vec![lead("l1", "s1")],
        });
        store.dispatch(PipelineAction::CreateLead { lead: lead("l2", "s1") });
        assert_eq!(store.state().phase(), Phase::Loaded);
        assert_eq!(store.state().leads_in_stage("s1").count(), 2);
    }

    #[test]
    fn test_listeners_see_each_resulting_state() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = PipelineStore::new();
        let sink = Rc::clone(&seen);
        store.subscribe(Box::new(move |action: &PipelineAction, state: &PipelineState| {
            let stage = state.lead("l1").map(|l| l.stage_id.clone()).unwrap_or_default();
            sink.borrow_mut().push(format!("{} {}", action.name(), stage));
        }));

        store.dispatch(PipelineAction::LoadSuccess {
            stages: vec![stage("s1", 0), stage("s2", 1)],
            leads: vec![lead("l1", "s1")],
        });
        store.dispatch(PipelineAction::MoveOptimistic {
            lead_id: "l1".to_string(),
            to_stage_id: "s2".to_string(),
        });

        assert_eq!(*seen.borrow(), vec!["LOAD_SUCCESS s1", "MOVE_OPTIMISTIC s2"]);
    }
}
