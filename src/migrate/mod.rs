//! Persisted Record Migration
//!
//! Versioned on-disk shape of a session record and its normalization into
//! [`SessionRecord`] at load time. Business logic never sees a missing
//! review field; defaults are applied here, once.
//!
//! Version history:
//! - 1 (no `schemaVersion`): `pagesRead`, `timeSpentMinutes`, `timestamp`,
//!   optional `reviewStep`, `nextReviewDate`, `isCondensed`
//! - 2: `quantity`, `durationMinutes`, `observedAt`, `step`, `nextDueAt`,
//!   `graduated`
//!
//! Defaults for absent review fields:
//! - step -> 0
//! - nextDueAt -> observedAt (immediately due, never "not due")
//! - graduated -> false

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{EngineError, EngineResult};
use crate::types::{ReviewState, SessionRecord};

/// Records written before versioning
pub const LEGACY_RECORD_VERSION: u32 = 1;

pub const CURRENT_RECORD_VERSION: u32 = 2;

/// Session record as stored by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSessionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<u32>,
    pub id: String,
    pub subject_id: String,
    #[serde(alias = "pagesRead")]
    pub quantity: f64,
    #[serde(alias = "timeSpentMinutes")]
    pub duration_minutes: f64,
    #[serde(alias = "timestamp")]
    pub observed_at: String,
    #[serde(default, alias = "reviewStep")]
    pub step: Option<u32>,
    #[serde(default, alias = "nextReviewDate")]
    pub next_due_at: Option<String>,
    #[serde(default, alias = "isCondensed")]
    pub graduated: Option<bool>,
}

fn parse_timestamp(field: &'static str, value: &str) -> EngineResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| EngineError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Normalize a persisted record of any supported version
pub fn normalize(raw: PersistedSessionRecord) -> EngineResult<SessionRecord> {
    let version = raw.schema_version.unwrap_or(LEGACY_RECORD_VERSION);
    if version > CURRENT_RECORD_VERSION {
        return Err(EngineError::UnsupportedVersion(version));
    }

    let observed_at = parse_timestamp("observedAt", &raw.observed_at)?;

    let next_due_at = match raw.next_due_at.as_deref() {
        Some(value) => parse_timestamp("nextDueAt", value).unwrap_or_else(|err| {
            warn!(error = %err, id = %raw.id, "Malformed review date, treating session as due");
            observed_at
        }),
        None => observed_at,
    };

    Ok(SessionRecord {
        id: raw.id,
        subject_id: raw.subject_id,
        quantity: raw.quantity,
        duration_minutes: raw.duration_minutes,
        observed_at,
        review: ReviewState {
            step: raw.step.unwrap_or(0),
            next_due_at,
            graduated: raw.graduated.unwrap_or(false),
        },
    })
}

/// Current persisted shape of a record
pub fn to_persisted(record: &SessionRecord) -> PersistedSessionRecord {
    PersistedSessionRecord {
        schema_version: Some(CURRENT_RECORD_VERSION),
        id: record.id.clone(),
        subject_id: record.subject_id.clone(),
        quantity: record.quantity,
        duration_minutes: record.duration_minutes,
        observed_at: format_timestamp(record.observed_at),
        step: Some(record.review.step),
        next_due_at: Some(format_timestamp(record.review.next_due_at)),
        graduated: Some(record.review.graduated),
    }
}

pub fn load_record(json: &str) -> EngineResult<SessionRecord> {
    let raw: PersistedSessionRecord = serde_json::from_str(json)?;
    normalize(raw)
}

/// Load a JSON array of records; the first bad record fails the whole load
pub fn load_records(json: &str) -> EngineResult<Vec<SessionRecord>> {
    let raws: Vec<PersistedSessionRecord> = serde_json::from_str(json)?;
    raws.into_iter().map(normalize).collect()
}

pub fn save_records(records: &[SessionRecord]) -> EngineResult<String> {
    let persisted: Vec<PersistedSessionRecord> = records.iter().map(to_persisted).collect();
    Ok(serde_json::to_string(&persisted)?)
}
