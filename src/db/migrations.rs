use rusqlite::{Connection, Result};
use std::collections::HashMap;

/// Current database schema version
const CURRENT_VERSION: u32 = 2;

/// Migration system for managing database schema versions
pub struct MigrationManager;

impl MigrationManager {
    /// Initialize the database with the current schema
    /// This creates the schema_version table and applies all migrations
    pub fn initialize(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            )",
            [],
        )?;

        let current_version: u32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        for version in (current_version + 1)..=CURRENT_VERSION {
            log::debug!("Applying schema migration v{}", version);
            Self::apply_migration(conn, version)?;
        }

        conn.execute("PRAGMA foreign_keys=ON", [])?;
        Ok(())
    }

    /// Apply a specific migration by version number
    fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
        let migrations = get_migrations();
        if let Some(migration) = migrations.get(&version) {
            let tx = conn.unchecked_transaction()?;
            migration(&tx)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
            Ok(())
        } else {
            Err(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
                Some(format!("No migration found for version {}", version)),
            ))
        }
    }

    /// Get the current schema version
    pub fn get_version(conn: &Connection) -> Result<u32> {
        conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
    }
}

/// Get all migrations indexed by version
fn get_migrations() -> HashMap<u32, fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>> {
    let mut migrations: HashMap<u32, fn(&rusqlite::Transaction) -> Result<(), rusqlite::Error>> = HashMap::new();
    migrations.insert(1, migration_v1);
    migrations.insert(2, migration_v2);
    migrations
}

/// Migration v1: stages and leads
fn migration_v1(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE stages (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            position INTEGER NOT NULL UNIQUE,
            slug TEXT NULL UNIQUE
        )",
        [],
    )?;
    // Stage ids equal their slugs for the seeded pipeline
    let seeds: [(&str, &str, i64); 6] = [
        ("new_contacts", "New Contacts", 0),
        ("contacted", "Contacted", 1),
        ("scheduled_meetings", "Scheduled Meetings", 2),
        ("proposal_sent", "Proposal Sent", 3),
        ("closed_won", "Closed Won", 4),
        ("closed_lost", "Closed Lost", 5),
    ];
    for (slug, name, position) in seeds {
        tx.execute(
            "INSERT INTO stages (id, name, position, slug) VALUES (?1, ?2, ?3, ?1)",
            rusqlite::params![slug, name, position],
        )?;
    }

    tx.execute(
        "CREATE TABLE leads (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT NULL,
            email TEXT NULL,
            stage_id TEXT NOT NULL REFERENCES stages(id),
            notes TEXT NOT NULL DEFAULT '',
            source TEXT NOT NULL DEFAULT '',
            next_follow_up_ts INTEGER NULL,
            created_ts INTEGER NOT NULL,
            modified_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute("CREATE INDEX idx_leads_stage_id ON leads(stage_id)", [])?;
    tx.execute("CREATE INDEX idx_leads_follow_up ON leads(next_follow_up_ts)", [])?;

    Ok(())
}

/// Migration v2: stage move ledger with idempotency markers
fn migration_v2(tx: &rusqlite::Transaction) -> Result<(), rusqlite::Error> {
    tx.execute(
        "CREATE TABLE stage_moves (
            idempotency_key TEXT PRIMARY KEY,
            lead_id TEXT NOT NULL REFERENCES leads(id),
            from_stage_id TEXT NOT NULL,
            to_stage_id TEXT NOT NULL REFERENCES stages(id),
            created_ts INTEGER NOT NULL
        )",
        [],
    )?;
    tx.execute("CREATE INDEX idx_stage_moves_lead ON stage_moves(lead_id)", [])?;
    Ok(())
}
