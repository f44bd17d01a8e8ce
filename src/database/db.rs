//! SQLite persistence for the mastery engine.
//!
//! Item and collocation mastery are stored as JSON keyed by id; calibration and
//! error logs are append-only tables pruned to a configured length.

use super::envelope;
use crate::analysis::calibration::{CalibrationRecord, ConfidenceLevel};
use crate::analysis::weakness::{ErrorCategory, WeaknessRecord};
use crate::error::EngineResult;
use crate::models::collocation::CollocationMastery;
use crate::models::mastery_record::{CurrentMasteryRecord, MasteryRecord};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Opens (or creates) the database file and makes sure all tables exist.
pub fn init_database(path: &Path) -> EngineResult<Connection> {
    let conn = Connection::open(path)?;
    create_schema(&conn)?;
    log::debug!("opened mastery store at {}", path.display());
    Ok(conn)
}

pub fn init_in_memory() -> EngineResult<Connection> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

fn create_schema(conn: &Connection) -> EngineResult<()> {
    // One JSON record per vocabulary item
    conn.execute(
        "CREATE TABLE IF NOT EXISTS item_mastery (
            item_id TEXT PRIMARY KEY,
            record TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS collocation_mastery (
            collocation_id TEXT PRIMARY KEY,
            record TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS calibration_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            confidence INTEGER NOT NULL,
            was_correct INTEGER NOT NULL,
            recorded_at TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS weakness_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL,
            item_id TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('schema_version', ?1)",
        params![envelope::CURRENT_SCHEMA.to_string()],
    )?;

    Ok(())
}

/// Record format version the store was created with.
pub fn schema_version(conn: &Connection) -> EngineResult<u32> {
    let value: String = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'schema_version'",
        [],
        |row| row.get(0),
    )?;
    Ok(value.parse().unwrap_or(envelope::CURRENT_SCHEMA))
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// `Ok(None)` when the item was never stored or its record is unreadable.
pub fn load_item_record(item_id: &str, conn: &Connection) -> EngineResult<Option<MasteryRecord>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT record FROM item_mastery WHERE item_id = ?1",
            params![item_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(raw.and_then(|raw| {
        let decoded = envelope::decode(&raw);
        if decoded.is_none() {
            log::warn!("item '{item_id}' has a corrupt record, starting over");
        }
        decoded
    }))
}

pub fn save_item_record(
    item_id: &str,
    record: &CurrentMasteryRecord,
    conn: &Connection,
) -> EngineResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO item_mastery (item_id, record) VALUES (?1, ?2)",
        params![item_id, envelope::encode(record)?],
    )?;
    Ok(())
}

/// Stores a raw value as-is, e.g. records imported from an older store.
pub fn save_raw_item_record(item_id: &str, raw: &str, conn: &Connection) -> EngineResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO item_mastery (item_id, record) VALUES (?1, ?2)",
        params![item_id, raw],
    )?;
    Ok(())
}

/// Every readable item record, ordered by item id. Corrupt rows are skipped.
pub fn load_all_item_records(conn: &Connection) -> EngineResult<Vec<(String, MasteryRecord)>> {
    let mut stmt = conn.prepare("SELECT item_id, record FROM item_mastery ORDER BY item_id")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows
        .into_iter()
        .filter_map(|(id, raw)| match envelope::decode(&raw) {
            Some(record) => Some((id, record)),
            None => {
                log::warn!("skipping corrupt record for item '{id}'");
                None
            }
        })
        .collect())
}

pub fn load_collocation_mastery(
    collocation_id: &str,
    conn: &Connection,
) -> EngineResult<Option<CollocationMastery>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT record FROM collocation_mastery WHERE collocation_id = ?1",
            params![collocation_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(raw.and_then(|raw| match serde_json::from_str(&raw) {
        Ok(mastery) => Some(mastery),
        Err(e) => {
            log::warn!("collocation '{collocation_id}' has a corrupt record: {e}");
            None
        }
    }))
}

pub fn save_collocation_mastery(
    collocation_id: &str,
    mastery: &CollocationMastery,
    conn: &Connection,
) -> EngineResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO collocation_mastery (collocation_id, record) VALUES (?1, ?2)",
        params![collocation_id, serde_json::to_string(mastery)?],
    )?;
    Ok(())
}

/// Appends to the calibration log and drops the oldest rows beyond `cap`.
pub fn append_calibration(
    record: &CalibrationRecord,
    cap: usize,
    conn: &Connection,
) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO calibration_log (confidence, was_correct, recorded_at) VALUES (?1, ?2, ?3)",
        params![
            u8::from(record.confidence_level),
            record.was_correct,
            record.recorded_at.to_rfc3339()
        ],
    )?;
    conn.execute(
        "DELETE FROM calibration_log WHERE id NOT IN
            (SELECT id FROM calibration_log ORDER BY id DESC LIMIT ?1)",
        params![cap as i64],
    )?;
    Ok(())
}

/// Calibration records, oldest first.
pub fn load_calibration_log(conn: &Connection) -> EngineResult<Vec<CalibrationRecord>> {
    let mut stmt = conn.prepare(
        "SELECT confidence, was_correct, recorded_at FROM calibration_log ORDER BY id ASC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, u8>(0)?,
                row.get::<_, bool>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows
        .into_iter()
        .filter_map(|(confidence, was_correct, recorded_at)| {
            Some(CalibrationRecord {
                confidence_level: ConfidenceLevel::from_u8(confidence)?,
                was_correct,
                recorded_at: parse_time(&recorded_at)?,
            })
        })
        .collect())
}

pub fn append_weakness(record: &WeaknessRecord, cap: usize, conn: &Connection) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO weakness_log (category, item_id, recorded_at) VALUES (?1, ?2, ?3)",
        params![
            record.error_category.as_str(),
            record.affected_item_id,
            record.timestamp.to_rfc3339()
        ],
    )?;
    conn.execute(
        "DELETE FROM weakness_log WHERE id NOT IN
            (SELECT id FROM weakness_log ORDER BY id DESC LIMIT ?1)",
        params![cap as i64],
    )?;
    Ok(())
}

/// Error records, oldest first. Rows with an unknown category are skipped.
pub fn load_weakness_log(conn: &Connection) -> EngineResult<Vec<WeaknessRecord>> {
    let mut stmt =
        conn.prepare("SELECT category, item_id, recorded_at FROM weakness_log ORDER BY id ASC")?;
    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows
        .into_iter()
        .filter_map(|(category, item_id, recorded_at)| {
            Some(WeaknessRecord {
                error_category: ErrorCategory::parse(&category)?,
                timestamp: parse_time(&recorded_at)?,
                affected_item_id: item_id,
            })
        })
        .collect())
}

/// Clears all learner data; the schema stays.
pub fn reset_all(conn: &Connection) -> EngineResult<()> {
    conn.execute_batch(
        "BEGIN;
         DELETE FROM item_mastery;
         DELETE FROM collocation_mastery;
         DELETE FROM calibration_log;
         DELETE FROM weakness_log;
         COMMIT;",
    )?;
    Ok(())
}
