use rusqlite::Connection;
use anyhow::Result;
use crate::config::PipelineConfig;
use crate::models::{Lead, LeadFilter, NewLead, Stage};
use crate::repo::{LeadRepo, MoveRecord, MoveRepo, StageRepo};

/// Remote data operations the pipeline depends on
pub trait PipelineBackend {
    /// All pipeline stages, ordered by position
    fn get_stages(&self) -> Result<Vec<Stage>>;

    /// Leads matching a named filter
    fn get_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>>;

    /// Insert a new lead; the backend assigns id, timestamps and stage
    fn create_lead(&self, fields: &NewLead) -> Result<Lead>;

    /// Move a lead to a stage. Retries carrying the same key are safe.
    fn move_lead_stage(&self, lead_id: &str, to_stage_id: &str, idempotency_key: &str) -> Result<()>;
}

/// Backend over the local SQLite ledger
pub struct SqliteBackend<'c> {
    conn: &'c Connection,
    config: PipelineConfig,
}

impl<'c> SqliteBackend<'c> {
    pub fn new(conn: &'c Connection, config: PipelineConfig) -> Self {
        Self { conn, config }
    }
}

impl PipelineBackend for SqliteBackend<'_> {
    fn get_stages(&self) -> Result<Vec<Stage>> {
        StageRepo::list_all(self.conn)
    }

    fn get_leads(&self, filter: &LeadFilter) -> Result<Vec<Lead>> {
        LeadRepo::list(self.conn, filter)
    }

    fn create_lead(&self, fields: &NewLead) -> Result<Lead> {
        LeadRepo::create(self.conn, fields, &self.config.default_stage)
    }

    fn move_lead_stage(&self, lead_id: &str, to_stage_id: &str, idempotency_key: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        match MoveRepo::apply(
            self.conn,
            lead_id,
            to_stage_id,
            idempotency_key,
            self.config.dedup_window_secs,
            now,
        )? {
            MoveRecord::Applied | MoveRecord::Replayed => Ok(()),
        }
    }
}
