//! Row-to-entity parsing helpers.
//!
//! Timestamps are written with `to_rfc3339()`, but rows inserted by hand or by
//! the column defaults use `SQLite`'s `datetime('now')` format, so both are
//! accepted on read.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with all urbis-core enums that use `#[serde(rename_all = "snake_case")]`.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum variant.
pub fn parse_enum<T: DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Parse a JSON TEXT column of row `id`.
///
/// # Errors
///
/// Returns `DatabaseError::Corrupt` naming the row and column on invalid JSON
/// or a shape mismatch.
pub fn parse_json_column<T: DeserializeOwned>(
    id: &str,
    column: &str,
    s: &str,
) -> Result<T, DatabaseError> {
    serde_json::from_str(s).map_err(|e| DatabaseError::Corrupt {
        id: id.to_string(),
        reason: format!("{column}: {e}"),
    })
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// You must use `get::<Option<String>>()` for nullable columns.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use urbis_core::enums::{EntityKind, LevelOfDetail};

    #[test]
    fn parses_rfc3339_and_sqlite_formats() {
        let a = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let b = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(a, b);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn parses_snake_case_enums() {
        let kind: EntityKind = parse_enum("building").unwrap();
        assert_eq!(kind, EntityKind::Building);
        let lod: LevelOfDetail = parse_enum("high").unwrap();
        assert_eq!(lod, LevelOfDetail::High);
        assert!(parse_enum::<EntityKind>("district").is_err());
    }

    #[test]
    fn json_column_errors_name_the_row() {
        let err = parse_json_column::<Vec<String>>("sit-00000001", "children", "{").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sit-00000001"), "{msg}");
        assert!(msg.contains("children"), "{msg}");
    }
}
