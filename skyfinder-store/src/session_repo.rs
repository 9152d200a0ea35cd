use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use skyfinder_core::repository::{SearchSession, SearchSessionRepository};
use skyfinder_core::{CoreError, CoreResult};

#[derive(Default)]
struct Sessions {
    by_id: HashMap<Uuid, SearchSession>,
    // insertion order, oldest first
    order: VecDeque<Uuid>,
}

/// Bounded in-memory session store. Once full, saving evicts the oldest
/// session.
pub struct InMemorySessionStore {
    capacity: usize,
    inner: RwLock<Sessions>,
}

impl InMemorySessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: RwLock::new(Sessions::default()),
        }
    }
}

#[async_trait]
impl SearchSessionRepository for InMemorySessionStore {
    async fn save_session(&self, session: SearchSession) -> CoreResult<Uuid> {
        if self.capacity == 0 {
            return Err(CoreError::InternalError("session store has zero capacity".to_string()));
        }

        let id = session.id;
        let mut inner = self.inner.write().await;

        if inner.by_id.insert(id, session).is_none() {
            inner.order.push_back(id);
        }

        while inner.order.len() > self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.by_id.remove(&oldest);
                debug!("Evicted search session {}", oldest);
            }
        }

        info!("Search session saved: {}", id);
        Ok(id)
    }

    async fn get_session(&self, id: Uuid) -> CoreResult<Option<SearchSession>> {
        let inner = self.inner.read().await;
        Ok(inner.by_id.get(&id).cloned())
    }

    async fn session_count(&self) -> CoreResult<usize> {
        Ok(self.inner.read().await.by_id.len())
    }
}
