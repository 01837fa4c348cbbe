//! Loading persisted records written by older versions of the app.

mod common;

use chrono::Duration;
use studywise_algo::migrate::{load_records, save_records};
use studywise_algo::queue::partition_records;
use studywise_algo::{EngineError, MemoryStore, RecordStore, ReviewScheduler};

use common::t0;

const MIXED_SNAPSHOT: &str = r#"[
    {"id": "legacy", "subjectId": "math", "pagesRead": 8, "timeSpentMinutes": 24,
     "timestamp": "2024-03-01T09:00:00.000Z", "isReviewed": false},
    {"id": "partial", "subjectId": "math", "pagesRead": 4, "timeSpentMinutes": 20,
     "timestamp": "2024-03-01T10:00:00.000Z", "reviewStep": 1},
    {"schemaVersion": 2, "id": "current", "subjectId": "bio", "quantity": 6,
     "durationMinutes": 18.5, "observedAt": "2024-03-01T11:00:00Z", "step": 2,
     "nextDueAt": "2024-03-05T11:00:00Z", "graduated": false},
    {"schemaVersion": 2, "id": "retired", "subjectId": "bio", "quantity": 6,
     "durationMinutes": 18.5, "observedAt": "2024-02-01T11:00:00Z", "step": 5,
     "nextDueAt": "2024-02-02T11:00:00Z", "graduated": true}
]"#;

#[test]
fn test_missing_review_fields_default_to_immediately_due() {
    let records = load_records(MIXED_SNAPSHOT).unwrap();
    assert_eq!(records.len(), 4);

    let legacy = &records[0];
    assert_eq!(legacy.review.step, 0);
    assert_eq!(legacy.review.next_due_at, legacy.observed_at);
    assert!(!legacy.review.graduated);

    let partial = &records[1];
    assert_eq!(partial.review.step, 1);
    assert_eq!(partial.review.next_due_at, partial.observed_at);
}

#[test]
fn test_migrated_records_partition_correctly() {
    let records = load_records(MIXED_SNAPSHOT).unwrap();
    let queue = partition_records(&records, t0() + Duration::hours(3));
    assert_eq!(queue.due, vec!["legacy".to_string(), "partial".to_string()]);
    assert_eq!(queue.upcoming, vec!["current".to_string()]);
}

#[test]
fn test_migrated_record_continues_schedule() {
    let records = load_records(MIXED_SNAPSHOT).unwrap();
    let scheduler = ReviewScheduler::default();
    let next = scheduler.complete(records[1].review, t0());
    assert_eq!(next.step, 2);
    assert_eq!(next.next_due_at, t0() + Duration::days(4));
}

#[test]
fn test_resave_writes_current_version() {
    let records = load_records(MIXED_SNAPSHOT).unwrap();
    let json = save_records(&records).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    for entry in value.as_array().unwrap() {
        assert_eq!(entry["schemaVersion"], 2);
        assert!(entry.get("timestamp").is_none());
        assert!(entry.get("reviewStep").is_none());
    }
    assert_eq!(load_records(&json).unwrap(), records);
}

#[test]
fn test_one_bad_record_fails_the_load() {
    let json = r#"[
        {"id": "ok", "subjectId": "math", "pagesRead": 1, "timeSpentMinutes": 1,
         "timestamp": "2024-03-01T09:00:00Z"},
        {"id": "bad", "subjectId": "math", "pagesRead": 1, "timeSpentMinutes": 1,
         "timestamp": "03/01/2024"}
    ]"#;
    assert!(matches!(
        load_records(json),
        Err(EngineError::InvalidTimestamp { .. })
    ));
}

#[test]
fn test_store_snapshot_matches_loader() {
    let store = MemoryStore::from_snapshot(MIXED_SNAPSHOT).unwrap();
    assert_eq!(store.load_all().unwrap(), load_records(MIXED_SNAPSHOT).unwrap());
}
