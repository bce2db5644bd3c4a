use rusqlite::{Connection, OptionalExtension};
use crate::repo::{LeadRepo, StageRepo};
use anyhow::{Context, Result};

/// Outcome of recording a stage move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRecord {
    /// The lead's stage was changed and a marker written
    Applied,
    /// A marker for this key exists inside the dedup window; nothing changed
    Replayed,
}

/// Stage move ledger
///
/// Each applied move writes a marker keyed by its idempotency key. A request
/// carrying a key whose marker is younger than the dedup window, for a lead
/// already in the destination stage, is treated as a retry of the same
/// logical move and acknowledged without writing. Otherwise the move is
/// applied and the marker overwritten, so a lead moved away and back along
/// an earlier transition is never silently left behind.
pub struct MoveRepo;

impl MoveRepo {
    /// Move a lead to a stage, deduplicating on `idempotency_key`.
    /// Runs in a single transaction.
    pub fn apply(
        conn: &Connection,
        lead_id: &str,
        to_stage_id: &str,
        idempotency_key: &str,
        dedup_window_secs: i64,
        now: i64,
    ) -> Result<MoveRecord> {
        let tx = conn.unchecked_transaction()?;

        let lead = LeadRepo::get_by_id(&tx, lead_id)?
            .ok_or_else(|| anyhow::anyhow!("Lead {} not found", lead_id))?;
        if StageRepo::get_by_id(&tx, to_stage_id)?.is_none() {
            anyhow::bail!("Stage {} not found", to_stage_id);
        }

        let marker_ts: Option<i64> = tx
            .query_row(
                "SELECT created_ts FROM stage_moves WHERE idempotency_key = ?1",
                [idempotency_key],
                |row| row.get(0),
            )
            .optional()?;
        // A fresh marker only proves a retry when the lead is still where that move put it
        if let Some(ts) = marker_ts {
            if now - ts <= dedup_window_secs && lead.stage_id == to_stage_id {
                log::info!("Stage move {} already applied; acknowledging replay", idempotency_key);
                return Ok(MoveRecord::Replayed);
            }
        }

        LeadRepo::set_stage(&tx, lead_id, to_stage_id)?;
        tx.execute(
            "INSERT OR REPLACE INTO stage_moves
                (idempotency_key, lead_id, from_stage_id, to_stage_id, created_ts)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![idempotency_key, lead_id, lead.stage_id, to_stage_id, now],
        )
        .with_context(|| format!("Failed to record stage move for lead {}", lead_id))?;

        tx.commit()?;
        log::info!("Moved lead {} from {} to {}", lead_id, lead.stage_id, to_stage_id);
        Ok(MoveRecord::Applied)
    }

    /// Number of recorded moves for a lead
    pub fn count_for_lead(conn: &Connection, lead_id: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM stage_moves WHERE lead_id = ?1",
            [lead_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
