//! HTTP confirmation queue.
//!
//! An invocation that needs approval registers a pending confirmation and
//! suspends on a oneshot channel. The user (or an agent host acting for
//! them) lists pending confirmations for their session and resolves one by
//! id:
//!
//! 1. `POST /webmcp/v1/tools/{name}/invoke` registers and waits
//! 2. `GET /webmcp/v1/confirmations` shows the prompt
//! 3. `POST /webmcp/v1/confirmations/{id}` with `{"approved": bool}` wakes the waiter
//!
//! If the waiting invoke request goes away (client disconnect, dispatcher
//! timeout) its entry is removed and any later resolve gets a 404.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::{debug, info};
use uuid::Uuid;
use webmcp_core::SessionId;
use webmcp_tools::{ConfirmationDecision, ConfirmationGate, ConfirmationRequest};

/// A confirmation waiting for a decision, as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct PendingConfirmation {
    pub id: Uuid,
    pub operation: String,
    pub prompt: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

struct Waiter {
    view: PendingConfirmation,
    session_id: SessionId,
    responder: oneshot::Sender<ConfirmationDecision>,
}

/// Pending confirmations keyed by id.
#[derive(Clone)]
pub struct ConfirmationQueue {
    inner: Arc<ConfirmationQueueInner>,
}

struct ConfirmationQueueInner {
    waiters: Mutex<HashMap<Uuid, Waiter>>,
    ttl: Duration,
}

impl ConfirmationQueue {
    /// Create a queue whose entries advertise `ttl` as their lifetime.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(ConfirmationQueueInner {
                waiters: Mutex::new(HashMap::new()),
                ttl,
            }),
        }
    }

    fn waiters(&self) -> MutexGuard<'_, HashMap<Uuid, Waiter>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.inner
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn register(
        &self,
        request: &ConfirmationRequest,
    ) -> (Uuid, oneshot::Receiver<ConfirmationDecision>) {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let ttl = chrono::Duration::from_std(self.inner.ttl).unwrap_or(chrono::Duration::MAX);
        let (responder, receiver) = oneshot::channel();

        let waiter = Waiter {
            view: PendingConfirmation {
                id,
                operation: request.operation.clone(),
                prompt: request.prompt.clone(),
                created_at,
                expires_at: created_at
                    .checked_add_signed(ttl)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            },
            session_id: request.session_id.clone(),
            responder,
        };
        self.waiters().insert(id, waiter);
        (id, receiver)
    }

    fn remove(&self, id: Uuid) {
        if self.waiters().remove(&id).is_some() {
            debug!(confirmation_id = %id, "Pending confirmation dropped");
        }
    }

    /// Pending confirmations belonging to a session, oldest first.
    #[must_use]
    pub fn pending_for(&self, session_id: &SessionId) -> Vec<PendingConfirmation> {
        let now = Utc::now();
        let mut pending: Vec<PendingConfirmation> = self
            .waiters()
            .values()
            .filter(|w| &w.session_id == session_id && w.view.expires_at > now)
            .map(|w| w.view.clone())
            .collect();
        pending.sort_by_key(|p| p.created_at);
        pending
    }

    /// Deliver a decision. Returns `false` if no such confirmation is pending
    /// for this session.
    pub fn resolve(
        &self,
        id: Uuid,
        session_id: &SessionId,
        decision: ConfirmationDecision,
    ) -> bool {
        let waiter = {
            let mut waiters = self.waiters();
            match waiters.get(&id) {
                Some(w) if &w.session_id == session_id => waiters.remove(&id),
                _ => None,
            }
        };
        let Some(waiter) = waiter else {
            return false;
        };

        info!(
            confirmation_id = %id,
            operation = %waiter.view.operation,
            approved = decision.approved,
            "Confirmation resolved"
        );
        // The waiter may have given up between lookup and send.
        waiter.responder.send(decision).is_ok()
    }

    /// Number of pending confirmations across all sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waiters().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes the entry when the waiting future is dropped.
struct PendingGuard<'a> {
    queue: &'a ConfirmationQueue,
    id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.queue.remove(self.id);
    }
}

#[async_trait]
impl ConfirmationGate for ConfirmationQueue {
    async fn request_confirmation(&self, request: &ConfirmationRequest) -> ConfirmationDecision {
        let (id, receiver) = self.register(request);
        let _guard = PendingGuard { queue: self, id };
        info!(
            confirmation_id = %id,
            operation = %request.operation,
            "Awaiting confirmation"
        );

        // A dropped sender means the entry was discarded: treat as declined.
        receiver.await.unwrap_or(ConfirmationDecision::DECLINED)
    }
}
