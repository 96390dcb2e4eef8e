//! Reconciliation engine: merges the authoritative remote list with the
//! local cache into one deduplicated, time-ordered view.
//!
//! Everything here is pure: no I/O, inputs are never mutated.
//!
//! Rules:
//! 1. Remote records form the base and are tagged `Remote`.
//! 2. A local record is appended as `LocalPending` only when no record in
//!    the result shares its id. A local record with a temporary id is also
//!    dropped when a remote record carries the same correlation key.
//! 3. The result is sorted by start time, ties broken by id.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use classroom_types::session::{chronological, RecordSource, SessionRecord, SessionStatus};

pub fn merge(remote: &[SessionRecord], local: &[SessionRecord]) -> Vec<SessionRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<SessionRecord> = Vec::with_capacity(remote.len() + local.len());

    for record in remote {
        if seen.insert(record.id.as_str()) {
            merged.push(record.clone().with_source(RecordSource::Remote));
        }
    }

    let confirmed_keys: HashSet<_> = merged.iter().map(SessionRecord::correlation_key).collect();

    for record in local {
        if seen.contains(record.id.as_str()) {
            continue;
        }
        if record.is_temporary() && confirmed_keys.contains(&record.correlation_key()) {
            continue;
        }
        seen.insert(record.id.as_str());
        merged.push(record.clone().with_source(RecordSource::LocalPending));
    }

    merged.sort_by(chronological);
    merged
}

/// Puts a freshly created record in front of the local list so the creator
/// sees it before the next remote refresh, then merges.
///
/// Temporary entries sharing the new record's correlation key are dropped
/// from the local list.
pub fn reconcile_after_create(
    new_record: &SessionRecord,
    remote: &[SessionRecord],
    local: &[SessionRecord],
) -> (Vec<SessionRecord>, Vec<SessionRecord>) {
    let key = new_record.correlation_key();
    let mut updated_local = Vec::with_capacity(local.len() + 1);
    updated_local.push(new_record.clone().with_source(RecordSource::LocalPending));
    updated_local.extend(
        local
            .iter()
            .filter(|r| r.id != new_record.id)
            .filter(|r| !(r.is_temporary() && r.correlation_key() == key))
            .cloned(),
    );
    (merge(remote, &updated_local), updated_local)
}

/// Removes `id` from both lists regardless of where it came from.
pub fn reconcile_after_delete(
    id: &str,
    remote: &[SessionRecord],
    local: &[SessionRecord],
) -> (Vec<SessionRecord>, Vec<SessionRecord>) {
    let remote: Vec<SessionRecord> = remote.iter().filter(|r| r.id != id).cloned().collect();
    let updated_local: Vec<SessionRecord> = local.iter().filter(|r| r.id != id).cloned().collect();
    (merge(&remote, &updated_local), updated_local)
}

/// Rebuilds the cache mirror after a successful remote listing for `scope`.
///
/// - remote records replace any cached copy;
/// - confirmed records of the same scope the remote no longer lists are
///   dropped (deleted elsewhere), unless they sit within
///   [`CLOCK_SKEW_TOLERANCE_MINUTES`] of a status boundary;
/// - completed records are pruned from the local side;
/// - local-pending records survive unless superseded by `merge`.
pub fn refresh_mirror(
    remote: &[SessionRecord],
    local: &[SessionRecord],
    scope: SessionStatus,
    now: DateTime<Utc>,
) -> Vec<SessionRecord> {
    let listed: HashSet<&str> = remote.iter().map(|r| r.id.as_str()).collect();
    let mut base: Vec<SessionRecord> = remote.to_vec();
    let mut pending: Vec<SessionRecord> = Vec::new();

    for record in local {
        if listed.contains(record.id.as_str()) {
            continue;
        }
        let status = record.status_at(now);
        if status == SessionStatus::Completed {
            continue;
        }
        match record.source {
            RecordSource::Remote if settled_in(record, scope, now) => {
                log::debug!("Session {} no longer listed remotely, dropping", record.id);
            }
            RecordSource::Remote => base.push(record.clone()),
            RecordSource::LocalPending => pending.push(record.clone()),
        }
    }

    merge(&base, &pending)
}

/// What a successful listing for `scope` shows: every record the remote
/// listed, whatever the local clock says, plus local-pending records whose
/// derived status matches. `mirror` keeps its order.
pub fn scoped_view(
    mirror: &[SessionRecord],
    remote: &[SessionRecord],
    scope: SessionStatus,
    now: DateTime<Utc>,
) -> Vec<SessionRecord> {
    let listed: HashSet<&str> = remote.iter().map(|r| r.id.as_str()).collect();
    mirror
        .iter()
        .filter(|r| match r.source {
            RecordSource::Remote => listed.contains(r.id.as_str()),
            RecordSource::LocalPending => r.status_at(now) == scope,
        })
        .cloned()
        .collect()
}

/// How far the remote clock may disagree with the local one. A confirmed
/// record this close to a status boundary may legitimately be listed under
/// the neighbouring scope.
pub const CLOCK_SKEW_TOLERANCE_MINUTES: i64 = 5;

/// `record` has status `scope` throughout the tolerance window around `now`.
fn settled_in(record: &SessionRecord, scope: SessionStatus, now: DateTime<Utc>) -> bool {
    let tolerance = Duration::minutes(CLOCK_SKEW_TOLERANCE_MINUTES);
    let earliest = now.checked_sub_signed(tolerance).unwrap_or(now);
    let latest = now.checked_add_signed(tolerance).unwrap_or(now);
    record.status_at(earliest) == scope && record.status_at(latest) == scope
}

/// Records in `records` whose derived status at `now` equals `status`.
pub fn with_status(
    records: &[SessionRecord],
    status: SessionStatus,
    now: DateTime<Utc>,
) -> Vec<SessionRecord> {
    records
        .iter()
        .filter(|r| r.status_at(now) == status)
        .cloned()
        .collect()
}

/// Splits a mirror into its confirmed and local-pending parts.
pub fn partition_by_source(records: &[SessionRecord]) -> (Vec<SessionRecord>, Vec<SessionRecord>) {
    records
        .iter()
        .cloned()
        .partition(|r| r.source == RecordSource::Remote)
}
