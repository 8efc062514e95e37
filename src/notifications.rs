//! # Notification queue
//!
//! Short-lived, user-facing messages. Each notification gets the next sequential id and,
//! unless its timeout is zero, a timer task that removes it once the timeout elapses.
//! Removing or clearing notifications cancels their pending timers.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Timeout used by the per-severity shortcuts. Errors linger longest.
    pub fn default_timeout_ms(self) -> u64 {
        match self {
            Severity::Info | Severity::Success => 5000,
            Severity::Warning => 6000,
            Severity::Error => 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    /// Zero means the notification stays until removed.
    pub timeout_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// What a caller supplies; unset fields take the queue defaults.
#[derive(Debug, Clone, Default)]
pub struct NewNotification {
    pub message: String,
    pub severity: Option<Severity>,
    pub timeout_ms: Option<u64>,
}

impl NewNotification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

struct Inner {
    items: Vec<Notification>,
    next_id: u64,
    timers: HashMap<u64, JoinHandle<()>>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            timers: HashMap::new(),
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, timer) in self.timers.drain() {
            timer.abort();
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Clone, Default)]
pub struct NotificationQueue {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("items", &lock(&self.inner).items)
            .finish()
    }
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a notification and returns its id.
    ///
    /// Expiry needs a tokio runtime; outside one the notification is kept until removed.
    pub fn add(&self, notification: NewNotification) -> u64 {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;

        let timeout_ms = notification.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        inner.items.push(Notification {
            id,
            message: notification.message,
            severity: notification.severity.unwrap_or_default(),
            timeout_ms,
            created_at: Utc::now(),
        });

        if timeout_ms > 0 {
            match Handle::try_current() {
                Ok(handle) => {
                    // The timer takes the lock to remove the entry, so it cannot run
                    // before its handle is recorded below.
                    let timer = handle.spawn(expire(Arc::downgrade(&self.inner), id, timeout_ms));
                    inner.timers.insert(id, timer);
                }
                Err(_) => warn!("No async runtime available; notification {} will not expire", id),
            }
        }
        id
    }

    fn add_with_severity(&self, severity: Severity, message: impl Into<String>) -> u64 {
        self.add(
            NewNotification::new(message)
                .severity(severity)
                .timeout_ms(severity.default_timeout_ms()),
        )
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.add_with_severity(Severity::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.add_with_severity(Severity::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.add_with_severity(Severity::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.add_with_severity(Severity::Warning, message)
    }

    /// Removes the notification if it is still queued. Unknown ids are ignored.
    pub fn remove(&self, id: u64) {
        let mut inner = lock(&self.inner);
        inner.items.retain(|n| n.id != id);
        if let Some(timer) = inner.timers.remove(&id) {
            timer.abort();
        }
    }

    pub fn clear(&self) {
        let mut inner = lock(&self.inner);
        inner.items.clear();
        for (_, timer) in inner.timers.drain() {
            timer.abort();
        }
    }

    /// Snapshot of queued notifications, oldest first.
    pub fn list(&self) -> Vec<Notification> {
        lock(&self.inner).items.clone()
    }

    pub fn get(&self, id: u64) -> Option<Notification> {
        lock(&self.inner).items.iter().find(|n| n.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of expiry timers still pending.
    pub fn pending_timers(&self) -> usize {
        lock(&self.inner).timers.len()
    }
}

async fn expire(inner: Weak<Mutex<Inner>>, id: u64, timeout_ms: u64) {
    tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
    if let Some(inner) = inner.upgrade() {
        let mut inner = lock(&inner);
        inner.timers.remove(&id);
        inner.items.retain(|n| n.id != id);
        debug!("Notification {} expired after {}ms", id, timeout_ms);
    }
}
