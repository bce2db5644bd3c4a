use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::{Lead, LeadFilter, NewLead, CLOSED_STAGE_SLUGS};
use crate::repo::StageRepo;
use anyhow::{Context, Result};

/// Lead repository for database operations
pub struct LeadRepo;

const LEAD_COLUMNS: &str =
    "l.id, l.name, l.phone, l.email, l.stage_id, l.notes, l.source, l.next_follow_up_ts, l.created_ts, l.modified_ts";

fn lead_from_row(row: &Row) -> rusqlite::Result<Lead> {
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        stage_id: row.get(4)?,
        notes: row.get(5)?,
        source: row.get(6)?,
        next_follow_up_ts: row.get(7)?,
        created_ts: row.get(8)?,
        modified_ts: row.get(9)?,
    })
}

impl LeadRepo {
    /// Create a new lead in the default stage.
    ///
    /// Any stage requested in `fields` is ignored: new leads always start in
    /// the stage whose slug is `default_stage_slug`.
    pub fn create(conn: &Connection, fields: &NewLead, default_stage_slug: &str) -> Result<Lead> {
        let stage = StageRepo::default_stage(conn, default_stage_slug)?;
        if let Some(requested) = fields.stage_id.as_deref() {
            if requested != stage.id {
                log::debug!(
                    "Requested stage '{}' ignored; new leads start in '{}'",
                    requested, stage.id
                );
            }
        }

        let now = chrono::Utc::now().timestamp();
        let lead = Lead {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name.trim().to_string(),
            phone: fields.phone.clone(),
            email: fields.email.clone(),
            stage_id: stage.id,
            notes: fields.notes.clone(),
            source: fields.source.clone(),
            next_follow_up_ts: fields.next_follow_up_ts,
            created_ts: now,
            modified_ts: now,
        };

        conn.execute(
            "INSERT INTO leads (id, name, phone, email, stage_id, notes, source,
                    next_follow_up_ts, created_ts, modified_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                lead.id,
                lead.name,
                lead.phone,
                lead.email,
                lead.stage_id,
                lead.notes,
                lead.source,
                lead.next_follow_up_ts,
                lead.created_ts,
                lead.modified_ts,
            ],
        )
        .with_context(|| format!("Failed to create lead: {}", lead.name))?;

        log::info!("Created lead {} in stage {}", lead.id, lead.stage_id);
        Ok(lead)
    }

    /// Get lead by ID
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Lead>> {
        let sql = format!("SELECT {} FROM leads l WHERE l.id = ?1", LEAD_COLUMNS);
        let lead = conn.query_row(&sql, [id], lead_from_row).optional()?;
        Ok(lead)
    }

    /// Find leads whose id starts with `prefix`
    pub fn find_by_prefix(conn: &Connection, prefix: &str) -> Result<Vec<Lead>> {
        let sql = format!(
            "SELECT {} FROM leads l WHERE substr(l.id, 1, length(?1)) = ?1 ORDER BY l.id",
            LEAD_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([prefix], lead_from_row)?;
        let mut leads = Vec::new();
        for row in rows {
            leads.push(row?);
        }
        Ok(leads)
    }

    /// List leads matching a named filter, oldest first
    pub fn list(conn: &Connection, filter: &LeadFilter) -> Result<Vec<Lead>> {
        let closed = CLOSED_STAGE_SLUGS
            .iter()
            .map(|s| format!("'{}'", s))
            .collect::<Vec<_>>()
            .join(", ");
        let (clause, param): (String, Option<String>) = match filter {
            LeadFilter::All => (String::new(), None),
            LeadFilter::Active => (
                format!("WHERE s.slug IS NULL OR s.slug NOT IN ({})", closed),
                None,
            ),
            LeadFilter::Stage(id) => ("WHERE l.stage_id = ?1".to_string(), Some(id.clone())),
        };
        let sql = format!(
            "SELECT {} FROM leads l JOIN stages s ON s.id = l.stage_id {} ORDER BY l.created_ts, l.id",
            LEAD_COLUMNS, clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = match &param {
            Some(p) => stmt.query_map([p], lead_from_row)?,
            None => stmt.query_map([], lead_from_row)?,
        };
        let mut leads = Vec::new();
        for row in rows {
            leads.push(row?);
        }
        Ok(leads)
    }

    /// Set a lead's stage. Returns false when the lead does not exist.
    pub fn set_stage(conn: &Connection, id: &str, stage_id: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let updated = conn
            .execute(
                "UPDATE leads SET stage_id = ?1, modified_ts = ?2 WHERE id = ?3",
                rusqlite::params![stage_id, now, id],
            )
            .with_context(|| format!("Failed to update stage of lead {}", id))?;
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbConnection;

    #[test]
    fn test_create_ignores_requested_stage() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let mut fields = NewLead::new("Grace Hopper");
        fields.stage_id = Some("scheduled_meetings".to_string());

        let lead = LeadRepo::create(&conn, &fields, "new_contacts").unwrap();
        assert_eq!(lead.stage_id, "new_contacts");

        let stored = LeadRepo::get_by_id(&conn, &lead.id).unwrap().unwrap();
        assert_eq!(stored, lead);
    }

    #[test]
    fn test_list_active_excludes_closed() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let open = LeadRepo::create(&conn, &NewLead::new("Open"), "new_contacts").unwrap();
        let won = LeadRepo::create(&conn, &NewLead::new("Won"), "new_contacts").unwrap();
        assert!(LeadRepo::set_stage(&conn, &won.id, "closed_won").unwrap());

        let active = LeadRepo::list(&conn, &LeadFilter::Active).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, open.id);

        let all = LeadRepo::list(&conn, &LeadFilter::All).unwrap();
        assert_eq!(all.len(), 2);

        let in_won = LeadRepo::list(&conn, &LeadFilter::Stage("closed_won".to_string())).unwrap();
        assert_eq!(in_won.len(), 1);
        assert_eq!(in_won[0].id, won.id);
    }

    #[test]
    fn test_set_stage_unknown_lead() {
        let conn = DbConnection::connect_in_memory().unwrap();
        assert!(!LeadRepo::set_stage(&conn, "missing", "contacted").unwrap());
    }

    #[test]
    fn test_find_by_prefix() {
        let conn = DbConnection::connect_in_memory().unwrap();
        let lead = LeadRepo::create(&conn, &NewLead::new("Prefix"), "new_contacts").unwrap();
        let found = LeadRepo::find_by_prefix(&conn, &lead.id[..8]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, lead.id);
    }
}
