//! Column codecs shared by the models
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC text so that string
//! comparison in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;

use crate::models::Nutrition;

/// Render a timestamp for storage, e.g. `2026-01-13T08:30:00.000Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

fn conversion_error(
    row: &Row,
    column: &str,
    err: Box<dyn std::error::Error + Send + Sync>,
) -> rusqlite::Error {
    let idx = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err)
}

pub fn timestamp_column(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(row, column, Box::new(e)))
}

pub fn json_column<T: DeserializeOwned>(row: &Row, column: &str) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(row, column, Box::new(e)))
}

/// Read the six `{prefix}_{nutrient}` columns
pub fn nutrition_columns(row: &Row, prefix: &str) -> rusqlite::Result<Nutrition> {
    Ok(Nutrition {
        calories: row.get(format!("{}_calories", prefix).as_str())?,
        protein: row.get(format!("{}_protein", prefix).as_str())?,
        carbohydrates: row.get(format!("{}_carbohydrates", prefix).as_str())?,
        fat: row.get(format!("{}_fat", prefix).as_str())?,
        sugar: row.get(format!("{}_sugar", prefix).as_str())?,
        fiber: row.get(format!("{}_fiber", prefix).as_str())?,
    })
}
