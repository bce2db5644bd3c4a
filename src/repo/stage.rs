use rusqlite::{Connection, OptionalExtension, Row};
use crate::models::Stage;
use anyhow::{Context, Result};

pub struct StageRepo;

fn stage_from_row(row: &Row) -> rusqlite::Result<Stage> {
    Ok(Stage {
        id: row.get(0)?,
        name: row.get(1)?,
        position: row.get(2)?,
        slug: row.get(3)?,
    })
}

impl StageRepo {
    /// List all stages ordered by position
    pub fn list_all(conn: &Connection) -> Result<Vec<Stage>> {
        let mut stmt = conn.prepare(
            "SELECT id, name, position, slug FROM stages ORDER BY position"
        )?;

        let rows = stmt.query_map([], stage_from_row)?;

        let mut stages = Vec::new();
        for row in rows {
            stages.push(row?);
        }
        Ok(stages)
    }

    /// Get stage by id
    pub fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Stage>> {
        let stage = conn
            .query_row(
                "SELECT id, name, position, slug FROM stages WHERE id = ?1",
                [id],
                stage_from_row,
            )
            .optional()?;
        Ok(stage)
    }

    /// Get stage by slug
    pub fn get_by_slug(conn: &Connection, slug: &str) -> Result<Option<Stage>> {
        let stage = conn
            .query_row(
                "SELECT id, name, position, slug FROM stages WHERE slug = ?1",
                [slug],
                stage_from_row,
            )
            .optional()?;
        Ok(stage)
    }

    /// Resolve a stage reference that may be either an id or a slug
    pub fn resolve(conn: &Connection, key: &str) -> Result<Option<Stage>> {
        if let Some(stage) = Self::get_by_id(conn, key)? {
            return Ok(Some(stage));
        }
        Self::get_by_slug(conn, key)
    }

    /// Get the stage new leads are placed in
    pub fn default_stage(conn: &Connection, slug: &str) -> Result<Stage> {
        Self::get_by_slug(conn, slug)?
            .with_context(|| format!("Default stage '{}' is not configured", slug))
    }
}
