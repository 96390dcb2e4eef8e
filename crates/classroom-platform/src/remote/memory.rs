//! In-process remote store.
//! Behaves like the REST backend (server-assigned ids, status windows) without
//! a network, for demos and offline development.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use async_trait::async_trait;

use classroom_core::ports::{Clock, RemoteSessionStore};
use classroom_types::{
    session::{chronological, RecordSource, SessionRecord, SessionStatus},
    DirectoryError, Result,
};

pub struct MemorySessionStore {
    sessions: RefCell<Vec<SessionRecord>>,
    joins: RefCell<HashMap<String, u32>>,
    clock: Rc<dyn Clock>,
}

impl MemorySessionStore {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            sessions: RefCell::new(Vec::new()),
            joins: RefCell::new(HashMap::new()),
            clock,
        }
    }

    /// Number of join pings recorded for `id`
    pub fn join_count(&self, id: &str) -> u32 {
        self.joins.borrow().get(id).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.sessions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.borrow().is_empty()
    }

    fn with_status(&self, wanted: SessionStatus) -> Vec<SessionRecord> {
        let now = self.clock.now();
        let mut matching: Vec<SessionRecord> = self
            .sessions
            .borrow()
            .iter()
            .filter(|s| s.status_at(now) == wanted)
            .cloned()
            .collect();
        matching.sort_by(chronological);
        matching
    }
}

#[async_trait(?Send)]
impl RemoteSessionStore for MemorySessionStore {
    async fn list_upcoming(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.with_status(SessionStatus::Upcoming))
    }

    async fn list_live(&self) -> Result<Vec<SessionRecord>> {
        Ok(self.with_status(SessionStatus::Live))
    }

    async fn create(&self, draft: &SessionRecord) -> Result<SessionRecord> {
        let mut created = draft.clone().with_source(RecordSource::Remote);
        created.id = uuid::Uuid::new_v4().to_string();
        if created.title.trim().is_empty() {
            created.title = created.topic.clone();
        }
        log::debug!("memory remote: created {} ({})", created.id, created.topic);
        self.sessions.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut sessions = self.sessions.borrow_mut();
        let before = sessions.len();
        sessions.retain(|s| s.id != id);
        if sessions.len() == before {
            return Err(DirectoryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn record_join(&self, id: &str) -> Result<()> {
        if !self.sessions.borrow().iter().any(|s| s.id == id) {
            return Err(DirectoryError::NotFound(id.to_string()));
        }
        *self.joins.borrow_mut().entry(id.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
