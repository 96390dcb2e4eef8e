//! Session directory: the public operations presentation layers call.
//!
//! Composes the remote store, the local cache mirror and the
//! reconciliation engine:
//! - reads fall back to the cache when the remote fails (degraded listing);
//! - creation failures are always surfaced;
//! - deletes apply locally first and never roll back;
//! - joins resolve the link locally and treat the analytics call as
//!   best-effort.

use std::rc::Rc;

use classroom_types::{
    config::DirectoryConfig,
    event::DirectoryEvent,
    session::{chronological, JoinResult, Listing, SessionRecord, SessionStatus},
    validation::{validate_for_scheduling, SchedulingRules, SessionDraft},
    DirectoryError, Result,
};
use crate::cache::{PendingDeletes, SessionCache};
use crate::event_bus::EventBus;
use crate::ports::{Clock, LinkOpener, RemoteSessionStore, StoragePort};
use crate::reconcile::{
    partition_by_source, reconcile_after_create, reconcile_after_delete, refresh_mirror,
    scoped_view, with_status,
};

pub struct SessionDirectory {
    remote: Rc<dyn RemoteSessionStore>,
    cache: SessionCache,
    pending_deletes: PendingDeletes,
    clock: Rc<dyn Clock>,
    rules: SchedulingRules,
    event_bus: EventBus,
}

impl SessionDirectory {
    /// Open the cache mirror and pending-delete set from `storage`.
    pub async fn open(
        config: &DirectoryConfig,
        remote: Rc<dyn RemoteSessionStore>,
        storage: Rc<dyn StoragePort>,
        clock: Rc<dyn Clock>,
        event_bus: EventBus,
    ) -> Self {
        let cache = SessionCache::open(storage.clone(), &config.cache_key).await;
        if cache.was_recovered() {
            event_bus.emit(DirectoryEvent::CacheRecovered {
                key: config.cache_key.clone(),
            });
        }
        let pending_deletes = PendingDeletes::open(storage, &config.pending_deletes_key()).await;
        log::info!(
            "Session directory ready: remote={}, {} cached, {} pending deletes",
            remote.backend_name(),
            cache.len(),
            pending_deletes.len()
        );

        Self {
            remote,
            cache,
            pending_deletes,
            clock,
            rules: config.scheduling_rules(),
            event_bus,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Validate a draft, create it remotely, and mirror the confirmed record.
    ///
    /// Validation runs before any I/O. A remote failure is returned as is;
    /// nothing is cached for a draft the server did not accept.
    pub async fn schedule_session(&self, draft: &SessionDraft) -> Result<SessionRecord> {
        let record = validate_for_scheduling(draft, &self.rules, self.clock.now())?;

        let confirmed = self.remote.create(&record).await.map_err(|e| {
            log::warn!("Scheduling '{}' failed: {}", record.topic, e);
            e
        })?;

        let (remote_part, local_part) = partition_by_source(&self.cache.load());
        let (merged, pending) = reconcile_after_create(&confirmed, &remote_part, &local_part);
        log::debug!("{} cached sessions await remote confirmation", pending.len());
        self.cache.save(merged);
        self.persist_cache().await;

        log::info!("Scheduled session {} ({})", confirmed.id, confirmed.topic);
        self.event_bus.emit(DirectoryEvent::SessionScheduled {
            id: confirmed.id.clone(),
        });

        self.refresh().await;
        Ok(confirmed)
    }

    pub async fn list_upcoming(&self) -> Listing {
        let fetched = self.remote.list_upcoming().await;
        self.listing(SessionStatus::Upcoming, fetched).await
    }

    pub async fn list_live(&self) -> Listing {
        let fetched = self.remote.list_live().await;
        self.listing(SessionStatus::Live, fetched).await
    }

    /// Remove a session locally, then delete it remotely.
    ///
    /// A failed remote delete keeps a tombstone for `retry_pending_deletes`
    /// and is reported as an event, not an error. `NotFound` is returned only
    /// when neither the cache nor the remote store knew the id.
    pub async fn delete_session(&self, id: &str) -> Result<()> {
        let known_locally = self.cache.contains(id);

        let (remote_part, local_part) = partition_by_source(&self.cache.load());
        let (merged, _) = reconcile_after_delete(id, &remote_part, &local_part);
        self.cache.save(merged);
        self.pending_deletes.insert(id);
        self.persist_cache().await;
        self.persist_pending_deletes().await;
        self.event_bus.emit(DirectoryEvent::SessionDeleted { id: id.to_string() });

        let outcome = match self.remote.delete(id).await {
            Ok(()) => {
                self.pending_deletes.remove(id);
                Ok(())
            }
            Err(DirectoryError::NotFound(_)) => {
                self.pending_deletes.remove(id);
                if known_locally {
                    Ok(())
                } else {
                    Err(DirectoryError::NotFound(id.to_string()))
                }
            }
            Err(e) => {
                log::warn!("Remote delete of {} failed, will retry: {}", id, e);
                self.event_bus.emit(DirectoryEvent::RemoteDeleteFailed {
                    id: id.to_string(),
                    message: e.to_string(),
                });
                Ok(())
            }
        };
        self.persist_pending_deletes().await;

        self.refresh().await;
        outcome
    }

    /// Resolve the meeting link for `id` from local state.
    ///
    /// Only the analytics ping touches the network, and its failure is
    /// swallowed.
    pub async fn join_session(&self, id: &str) -> Result<JoinResult> {
        let joined = self.resolve_join(id)?;
        self.record_join(id).await;
        Ok(joined)
    }

    /// Resolve the link and hand it to `opener` without suspending, so a
    /// browser still treats the open as part of the user's click. Follow
    /// with [`record_join`](Self::record_join); nothing is recorded when
    /// opening fails.
    pub fn open_session(&self, id: &str, opener: &dyn LinkOpener) -> Result<JoinResult> {
        let joined = self.resolve_join(id)?;
        opener.open(&joined.resolved_link).map_err(|e| {
            log::warn!("Opening {} for {} failed: {}", joined.resolved_link, id, e);
            e
        })?;
        Ok(joined)
    }

    /// Best-effort join analytics.
    pub async fn record_join(&self, id: &str) {
        if let Err(e) = self.remote.record_join(id).await {
            log::warn!("Join analytics for {} failed: {}", id, e);
            self.event_bus.emit(DirectoryEvent::JoinRecordFailed {
                id: id.to_string(),
                message: e.to_string(),
            });
        }
    }

    fn resolve_join(&self, id: &str) -> Result<JoinResult> {
        let record = self
            .session(id)
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;
        let resolved_link = record
            .resolved_link()
            .ok_or_else(|| DirectoryError::MissingLink(id.to_string()))?;
        Ok(JoinResult {
            session_id: record.id,
            resolved_link,
            meeting_platform: record.meeting_platform,
        })
    }

    /// Refetch both scopes. Returns whether the remote answered both.
    pub async fn refresh(&self) -> bool {
        let upcoming = self.list_upcoming().await;
        let live = self.list_live().await;
        !upcoming.degraded && !live.degraded
    }

    /// Retry remote deletes that failed earlier. Returns how many remain.
    pub async fn retry_pending_deletes(&self) -> usize {
        for id in self.pending_deletes.ids() {
            match self.remote.delete(&id).await {
                Ok(()) | Err(DirectoryError::NotFound(_)) => {
                    log::info!("Remote delete of {} confirmed", id);
                    self.pending_deletes.remove(&id);
                    self.cache.remove(&id);
                }
                Err(e) => log::debug!("Remote delete of {} still failing: {}", id, e),
            }
        }
        self.persist_cache().await;
        self.persist_pending_deletes().await;
        self.pending_deletes.len()
    }

    /// A visible session by id, from local state only.
    pub fn session(&self, id: &str) -> Option<SessionRecord> {
        if self.pending_deletes.contains(id) {
            return None;
        }
        self.cache.get(id)
    }

    pub fn pending_delete_count(&self) -> usize {
        self.pending_deletes.len()
    }

    async fn listing(
        &self,
        scope: SessionStatus,
        fetched: Result<Vec<SessionRecord>>,
    ) -> Listing {
        let now = self.clock.now();
        match fetched {
            Ok(remote) => {
                let mirror = refresh_mirror(&remote, &self.cache.load(), scope, now);
                let sessions = self.visible(scoped_view(&mirror, &remote, scope, now));
                self.cache.save(mirror);
                self.persist_cache().await;
                Listing {
                    sessions,
                    degraded: false,
                }
            }
            Err(e) => {
                log::warn!("Listing {} sessions from cache: {}", scope.label(), e);
                self.event_bus.emit(DirectoryEvent::ListingDegraded {
                    reason: e.to_string(),
                });
                let mut sessions = self.visible(with_status(&self.cache.load(), scope, now));
                sessions.sort_by(chronological);
                Listing {
                    sessions,
                    degraded: true,
                }
            }
        }
    }

    fn visible(&self, records: Vec<SessionRecord>) -> Vec<SessionRecord> {
        records
            .into_iter()
            .filter(|r| !self.pending_deletes.contains(&r.id))
            .collect()
    }

    async fn persist_cache(&self) {
        if let Err(e) = self.cache.flush().await {
            log::warn!("Persisting session cache '{}' failed: {}", self.cache.key(), e);
        }
    }

    async fn persist_pending_deletes(&self) {
        if let Err(e) = self.pending_deletes.flush().await {
            log::warn!("Persisting pending deletes failed: {}", e);
        }
    }
}
