//! WASM-target tests for classroom-platform (Node.js runtime).
//!
//! Tests MemoryStorage, the in-process remote store, the HTTP envelope
//! decoding and the timeout helper under wasm32-unknown-unknown via
//! `wasm-pack test --node`.
//!
//! localStorage and window.open need a browser and are not covered here.

use wasm_bindgen_test::*;

use classroom_core::event_bus::EventBus;
use classroom_core::ports::{Clock, RemoteSessionStore, StoragePort};
use classroom_core::SessionDirectory;
use classroom_platform::remote::http::{create_body, decode_envelope, parse_session};
use classroom_platform::remote::MemorySessionStore;
use classroom_platform::storage::MemoryStorage;
use classroom_platform::timeout::with_timeout;
use classroom_types::config::DirectoryConfig;
use classroom_types::event::DirectoryEvent;
use classroom_types::session::*;
use classroom_types::validation::SessionDraft;
use classroom_types::DirectoryError;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::rc::Rc;

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

struct Pinned(DateTime<Utc>);

impl Clock for Pinned {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn draft(topic: &str, start: &str) -> SessionDraft {
    SessionDraft {
        course_id: "foundation-9".to_string(),
        topic: topic.to_string(),
        instructor_name: "K. Rao".to_string(),
        start_time: start.to_string(),
        duration_minutes: 60,
        meeting_link: Some("meet.google.com/abc-defg-hij".to_string()),
        ..SessionDraft::default()
    }
}

fn record(id: &str) -> SessionRecord {
    SessionRecord {
        id: id.to_string(),
        course_id: "foundation-9".to_string(),
        title: "Motion".to_string(),
        subject: "Physics".to_string(),
        topic: "Motion".to_string(),
        instructor_name: "K. Rao".to_string(),
        start_time: t0(),
        duration_minutes: 60,
        meeting_link: "zoom.us/j/42".to_string(),
        meeting_platform: MeetingPlatform::Zoom,
        source: RecordSource::LocalPending,
    }
}

// ─── MemoryStorage Tests ─────────────────────────────────

#[wasm_bindgen_test]
fn memory_storage_backend_name() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.backend_name(), "memory");
}

#[wasm_bindgen_test]
async fn memory_storage_set_and_get() {
    let storage = MemoryStorage::new();
    storage.set("key1", b"value1").await.unwrap();
    assert_eq!(storage.get("key1").await.unwrap(), Some(b"value1".to_vec()));
}

#[wasm_bindgen_test]
async fn memory_storage_delete_nonexistent() {
    let storage = MemoryStorage::new();
    storage.delete("nonexistent").await.unwrap();
}

#[wasm_bindgen_test]
async fn memory_storage_delete_leaves_other_keys() {
    let storage = MemoryStorage::new();
    storage.set("classroom:live-classes", b"[]").await.unwrap();
    storage.set("classroom:live-classes:pending-deletes", b"[\"s1\"]").await.unwrap();
    storage.delete("classroom:live-classes:pending-deletes").await.unwrap();
    assert!(storage.get("classroom:live-classes:pending-deletes").await.unwrap().is_none());
    assert_eq!(storage.get("classroom:live-classes").await.unwrap(), Some(b"[]".to_vec()));
    assert_eq!(storage.used_bytes(), "classroom:live-classes".len() + 2);
}

#[wasm_bindgen_test]
async fn memory_storage_quota_rejects_oversized_write() {
    let storage = MemoryStorage::with_quota(16);
    storage.set("k", b"0123456789").await.unwrap();
    let err = storage.set("k2", b"0123456789").await.unwrap_err();
    assert!(matches!(err, DirectoryError::Storage(_)));
    // Replacing an existing value only counts the difference
    storage.set("k", b"01234").await.unwrap();
    assert_eq!(storage.used_bytes(), 6);
}

// ─── MemorySessionStore Tests ────────────────────────────

#[wasm_bindgen_test]
async fn memory_remote_assigns_server_ids() {
    let store = MemorySessionStore::new(Rc::new(Pinned(t0() - Duration::hours(1))));
    let created = store.create(&record("tmp-1")).await.unwrap();
    assert_ne!(created.id, "tmp-1");
    assert!(!created.is_temporary());
    assert_eq!(created.source, RecordSource::Remote);
    assert_eq!(store.len(), 1);
}

#[wasm_bindgen_test]
async fn memory_remote_lists_by_status() {
    let store = MemorySessionStore::new(Rc::new(Pinned(t0() + Duration::minutes(10))));
    let live = store.create(&record("a")).await.unwrap();
    let mut later = record("b");
    later.start_time = t0() + Duration::days(1);
    let upcoming = store.create(&later).await.unwrap();

    let live_list = store.list_live().await.unwrap();
    assert_eq!(live_list.len(), 1);
    assert_eq!(live_list[0].id, live.id);

    let upcoming_list = store.list_upcoming().await.unwrap();
    assert_eq!(upcoming_list.len(), 1);
    assert_eq!(upcoming_list[0].id, upcoming.id);
}

#[wasm_bindgen_test]
async fn memory_remote_delete_unknown_is_not_found() {
    let store = MemorySessionStore::new(Rc::new(Pinned(t0())));
    let err = store.delete("missing").await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound(_)));
}

#[wasm_bindgen_test]
async fn memory_remote_counts_joins() {
    let store = MemorySessionStore::new(Rc::new(Pinned(t0())));
    let created = store.create(&record("a")).await.unwrap();
    store.record_join(&created.id).await.unwrap();
    store.record_join(&created.id).await.unwrap();
    assert_eq!(store.join_count(&created.id), 2);
}

// ─── Envelope Tests ──────────────────────────────────────

#[wasm_bindgen_test]
fn envelope_success_yields_data() {
    let data: Option<Vec<u32>> =
        decode_envelope(200, r#"{"success":true,"data":[1,2]}"#, None).unwrap();
    assert_eq!(data, Some(vec![1, 2]));
}

#[wasm_bindgen_test]
fn envelope_failure_flag_is_rejected_with_message() {
    let err = decode_envelope::<serde_json::Value>(
        200,
        r#"{"success":false,"message":"Meeting link is required"}"#,
        None,
    )
    .unwrap_err();
    match err {
        DirectoryError::RemoteRejected(msg) => assert_eq!(msg, "Meeting link is required"),
        other => panic!("unexpected {:?}", other),
    }
}

#[wasm_bindgen_test]
fn envelope_404_on_delete_is_not_found() {
    let err = decode_envelope::<serde_json::Value>(
        404,
        r#"{"success":false,"message":"Live class not found"}"#,
        Some("s1"),
    )
    .unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound(id) if id == "s1"));
}

#[wasm_bindgen_test]
fn envelope_404_elsewhere_is_rejected() {
    let err = decode_envelope::<serde_json::Value>(404, "", None).unwrap_err();
    assert!(matches!(err, DirectoryError::RemoteRejected(msg) if msg == "HTTP 404"));
}

#[wasm_bindgen_test]
fn envelope_html_error_page_is_rejected() {
    let err = decode_envelope::<serde_json::Value>(502, "<html>Bad Gateway</html>", None)
        .unwrap_err();
    assert!(matches!(err, DirectoryError::RemoteRejected(msg) if msg == "HTTP 502"));
}

#[wasm_bindgen_test]
fn envelope_malformed_success_body_is_serialization_error() {
    let err = decode_envelope::<serde_json::Value>(200, "not json", None).unwrap_err();
    assert!(matches!(err, DirectoryError::Serialization(_)));
}

#[wasm_bindgen_test]
fn envelope_empty_success_body_has_no_data() {
    let data: Option<serde_json::Value> = decode_envelope(204, "", None).unwrap();
    assert!(data.is_none());
}

// ─── Wire Format Tests ───────────────────────────────────

#[wasm_bindgen_test]
fn create_body_omits_id_and_source() {
    let body = create_body(&record("tmp-1700000000000")).unwrap();
    assert!(body.get("id").is_none());
    assert!(body.get("source").is_none());
    assert_eq!(body["topic"], "Motion");
    assert_eq!(body["durationMinutes"], 60);
    assert_eq!(body["instructorName"], "K. Rao");
}

#[wasm_bindgen_test]
fn parse_session_accepts_server_shape() {
    let parsed = parse_session(json!({
        "_id": "65a1",
        "courseId": "foundation-9",
        "topic": "Motion",
        "instructorName": "K. Rao",
        "startTime": "2024-01-01T10:00:00Z",
        "duration": 45,
        "meetingLink": "https://meet.google.com/abc",
        "meetingPlatform": "Google Meet"
    }))
    .unwrap();
    assert_eq!(parsed.id, "65a1");
    assert_eq!(parsed.title, "Motion");
    assert_eq!(parsed.duration_minutes, 45);
    assert_eq!(parsed.meeting_platform, MeetingPlatform::GoogleMeet);
    assert_eq!(parsed.source, RecordSource::Remote);
}

#[wasm_bindgen_test]
fn parse_session_infers_unknown_platform_from_link() {
    let parsed = parse_session(json!({
        "id": "s1",
        "startTime": "2024-01-01T10:00:00Z",
        "durationMinutes": 30,
        "meetingLink": "https://us02web.zoom.us/j/1",
        "meetingPlatform": "webex-ish"
    }))
    .unwrap();
    assert_eq!(parsed.meeting_platform, MeetingPlatform::Zoom);
}

// ─── Timeout Tests ───────────────────────────────────────

#[wasm_bindgen_test]
async fn timeout_fires_for_stalled_future() {
    let stalled = futures::future::pending::<classroom_types::Result<()>>();
    let err = with_timeout(5, stalled).await.unwrap_err();
    assert!(matches!(err, DirectoryError::Timeout(5)));
    assert!(err.is_network());
}

#[wasm_bindgen_test]
async fn timeout_passes_through_ready_result() {
    let value = with_timeout(1_000, async { Ok(7u8) }).await.unwrap();
    assert_eq!(value, 7);
}

// ─── Directory over memory adapters ──────────────────────

#[wasm_bindgen_test]
async fn directory_schedules_lists_and_joins_in_memory() {
    let clock: Rc<dyn Clock> = Rc::new(Pinned(t0() - Duration::hours(2)));
    let remote = Rc::new(MemorySessionStore::new(clock.clone()));
    let directory = SessionDirectory::open(
        &DirectoryConfig::default(),
        remote.clone(),
        Rc::new(MemoryStorage::new()),
        clock,
        EventBus::new(),
    )
    .await;

    let created = directory
        .schedule_session(&draft("Motion", "2024-01-01T10:00:00Z"))
        .await
        .unwrap();

    let listing = directory.list_upcoming().await;
    assert!(!listing.degraded);
    assert_eq!(listing.sessions.len(), 1);
    assert_eq!(listing.sessions[0].id, created.id);

    let joined = directory.join_session(&created.id).await.unwrap();
    assert_eq!(joined.resolved_link, "https://meet.google.com/abc-defg-hij");
    assert_eq!(joined.meeting_platform, MeetingPlatform::GoogleMeet);
    assert_eq!(remote.join_count(&created.id), 1);

    directory.delete_session(&created.id).await.unwrap();
    assert!(remote.is_empty());
    assert!(directory.list_upcoming().await.sessions.is_empty());

    let events = directory.event_bus().drain();
    assert!(events.contains(&DirectoryEvent::SessionScheduled { id: created.id.clone() }));
    assert!(events.contains(&DirectoryEvent::SessionDeleted { id: created.id }));
}

#[wasm_bindgen_test]
async fn directory_survives_full_storage() {
    let clock: Rc<dyn Clock> = Rc::new(Pinned(t0() - Duration::hours(2)));
    let remote = Rc::new(MemorySessionStore::new(clock.clone()));
    let directory = SessionDirectory::open(
        &DirectoryConfig::default(),
        remote,
        Rc::new(MemoryStorage::with_quota(0)),
        clock,
        EventBus::new(),
    )
    .await;

    let created = directory
        .schedule_session(&draft("Motion", "2024-01-01T10:00:00Z"))
        .await
        .unwrap();
    // Persistence failed but the in-memory mirror still serves the session
    assert!(directory.session(&created.id).is_some());
}
