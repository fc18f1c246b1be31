//! Toast store — in-memory queue of transient user-facing notifications
//! with per-toast auto-expiry and broadcast to UI subscribers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};
use tracing::debug;

/// Default display duration before a toast auto-expires.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A transient user-facing notification.
#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    /// Display duration; the store removes the toast once it elapses.
    pub timeout: Duration,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Store change events broadcast to subscribers (e.g. a UI layer).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToastEvent {
    Added { toast: Toast },
    Removed { id: u64 },
}

/// In-memory toast store.
///
/// Owns the ordered set of currently visible toasts. All mutation goes
/// through [`add`](Self::add) and [`remove`](Self::remove); each add
/// schedules a removal task that fires after the toast's timeout, and an
/// explicit remove cancels that task. Ids come from a per-store monotonic
/// counter, so they are unique even for toasts created in the same instant.
pub struct ToastStore {
    toasts: RwLock<Vec<Toast>>,
    expiries: RwLock<HashMap<u64, tokio::task::JoinHandle<()>>>,
    next_id: AtomicU64,
    tx: broadcast::Sender<ToastEvent>,
}

impl ToastStore {
    /// Create a new, empty store.
    pub fn new() -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(DEFAULT_BROADCAST_CAPACITY);
        Arc::new(Self {
            toasts: RwLock::new(Vec::new()),
            expiries: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            tx,
        })
    }

    /// Subscribe to add/remove events.
    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.tx.subscribe()
    }

    /// Add an informational toast with the default 5 second timeout.
    /// Returns its id.
    pub async fn add_default(self: &Arc<Self>, message: impl Into<String>) -> u64 {
        self.add_with_timeout(message, ToastKind::Info, DEFAULT_TIMEOUT)
            .await
    }

    /// Add a toast with the default 5 second timeout. Returns its id.
    pub async fn add(self: &Arc<Self>, message: impl Into<String>, kind: ToastKind) -> u64 {
        self.add_with_timeout(message, kind, DEFAULT_TIMEOUT).await
    }

    /// Add a toast that auto-expires after `timeout`. Returns its id.
    ///
    /// Never fails and never blocks other tasks; the store is unbounded.
    pub async fn add_with_timeout(
        self: &Arc<Self>,
        message: impl Into<String>,
        kind: ToastKind,
        timeout: Duration,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            kind,
            timeout,
            created_at: chrono::Utc::now(),
        };

        debug!(id, ?kind, message = %toast.message, "Toast added");

        let event = ToastEvent::Added {
            toast: toast.clone(),
        };
        {
            let mut toasts = self.toasts.write().await;
            toasts.push(toast);
        }

        // Broadcast — ok if no receivers are listening yet
        let _ = self.tx.send(event);

        // Schedule the auto-removal; the handle is retained so an explicit
        // remove can cancel it. Held write lock: an expiry that fires
        // immediately blocks in remove() until its handle is tracked, so it
        // always cleans its own entry out of the map.
        let mut expiries = self.expiries.write().await;
        let store = Arc::clone(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            store.remove(id).await;
        });
        expiries.insert(id, handle);
        drop(expiries);

        id
    }

    /// Remove the toast with the given id, cancelling its pending expiry.
    ///
    /// A no-op if the id is unknown or the toast already expired.
    pub async fn remove(&self, id: u64) {
        let removed = {
            let mut toasts = self.toasts.write().await;
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            toasts.len() != before
        };

        // When called from the expiry task this aborts the running task
        // itself; nothing after this point awaits, so the task still runs
        // to completion. Aborting an already-finished handle is a no-op.
        if let Some(handle) = self.expiries.write().await.remove(&id) {
            handle.abort();
        }

        if removed {
            debug!(id, "Toast removed");
            let _ = self.tx.send(ToastEvent::Removed { id });
        }
    }

    /// Snapshot of the currently visible toasts, in insertion order.
    pub async fn toasts(&self) -> Vec<Toast> {
        self.toasts.read().await.clone()
    }

    /// Number of currently visible toasts.
    pub async fn len(&self) -> usize {
        self.toasts.read().await.len()
    }

    /// Check if no toasts are visible.
    pub async fn is_empty(&self) -> bool {
        self.toasts.read().await.is_empty()
    }
}
