//! Review Queue
//!
//! Splits active review states into those due now and those upcoming.
//! Graduated states appear in neither list. Both lists are ordered by
//! `nextDueAt` ascending with a stable sort, so ties keep insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::retention_percent;
use crate::types::{ReviewState, SessionRecord};

/// Number of entries the forgetting archive shows by default
pub const DEFAULT_ARCHIVE_LIMIT: usize = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueue<K> {
    /// Most overdue first
    pub due: Vec<K>,
    /// Soonest first
    pub upcoming: Vec<K>,
}

impl<K> Default for ReviewQueue<K> {
    fn default() -> Self {
        Self {
            due: Vec::new(),
            upcoming: Vec::new(),
        }
    }
}

impl<K> ReviewQueue<K> {
    pub fn is_empty(&self) -> bool {
        self.due.is_empty() && self.upcoming.is_empty()
    }
}

/// Partition `(id, state)` pairs against `now`
pub fn partition<K, I>(states: I, now: DateTime<Utc>) -> ReviewQueue<K>
where
    I: IntoIterator<Item = (K, ReviewState)>,
{
    let mut due: Vec<(K, DateTime<Utc>)> = Vec::new();
    let mut upcoming: Vec<(K, DateTime<Utc>)> = Vec::new();

    for (id, state) in states {
        if state.graduated {
            continue;
        }
        if state.next_due_at <= now {
            due.push((id, state.next_due_at));
        } else {
            upcoming.push((id, state.next_due_at));
        }
    }

    // slice::sort_by_key is stable
    due.sort_by_key(|(_, at)| *at);
    upcoming.sort_by_key(|(_, at)| *at);

    ReviewQueue {
        due: due.into_iter().map(|(id, _)| id).collect(),
        upcoming: upcoming.into_iter().map(|(id, _)| id).collect(),
    }
}

/// Partition session records by id
pub fn partition_records(records: &[SessionRecord], now: DateTime<Utc>) -> ReviewQueue<String> {
    partition(records.iter().map(|r| (r.id.clone(), r.review)), now)
}

/// Archive entry with its estimated retention
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveEntry {
    pub session_id: String,
    pub subject_id: String,
    pub retention_percent: u8,
}

/// Active sessions ordered from most to least forgotten, truncated to `limit`
pub fn forgetting_archive(
    records: &[SessionRecord],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ArchiveEntry> {
    let mut entries: Vec<ArchiveEntry> = records
        .iter()
        .filter(|r| r.review.is_active())
        .map(|r| ArchiveEntry {
            session_id: r.id.clone(),
            subject_id: r.subject_id.clone(),
            retention_percent: retention_percent(r.observed_at, r.review.step, now),
        })
        .collect();

    entries.sort_by_key(|e| e.retention_percent);
    entries.truncate(limit);
    entries
}
