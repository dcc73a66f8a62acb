use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::HealthSummary;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fetch the summary row for a profile, if any.
pub fn get_summary_by_profile(
    conn: &Connection,
    profile_id: &str,
) -> Result<Option<HealthSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, profile_id, summary_content, last_updated_source, created_at, updated_at
         FROM health_summaries WHERE profile_id = ?1 LIMIT 1",
    )?;
    let mut rows = stmt.query_map(params![profile_id], row_to_summary)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Insert-or-update keyed by profile id, in one statement.
///
/// On conflict the existing row keeps its `id` and `created_at`; content,
/// source and `updated_at` are overwritten.
pub fn upsert_summary(conn: &Connection, summary: &HealthSummary) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO health_summaries
         (id, profile_id, summary_content, last_updated_source, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(profile_id) DO UPDATE SET
             summary_content = excluded.summary_content,
             last_updated_source = excluded.last_updated_source,
             updated_at = excluded.updated_at",
        params![
            summary.id.to_string(),
            summary.profile_id,
            summary.summary_content,
            summary.last_updated_source,
            summary.created_at.format(TIMESTAMP_FORMAT).to_string(),
            summary.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Remove the profile's summary (profile erasure). Returns rows removed.
pub fn delete_summary_for_profile(conn: &Connection, profile_id: &str) -> Result<u64, DatabaseError> {
    let affected = conn.execute(
        "DELETE FROM health_summaries WHERE profile_id = ?1",
        params![profile_id],
    )?;
    Ok(affected as u64)
}

fn row_to_summary(row: &rusqlite::Row) -> Result<HealthSummary, rusqlite::Error> {
    let id_str: String = row.get(0)?;
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;

    Ok(HealthSummary {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        profile_id: row.get(1)?,
        summary_content: row.get(2)?,
        last_updated_source: row.get(3)?,
        created_at: NaiveDateTime::parse_from_str(&created_str, TIMESTAMP_FORMAT)
            .unwrap_or_default(),
        updated_at: NaiveDateTime::parse_from_str(&updated_str, TIMESTAMP_FORMAT)
            .unwrap_or_default(),
    })
}
