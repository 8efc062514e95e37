//! # Stores
//!
//! In-memory holders of fetched entities plus the status of the last request.
//!
//! Every store action follows the same shape: mark the store `Loading`, perform exactly one
//! API round trip, then either merge the result into local state and mark it `Ready`, or
//! record the error message, mark it `Failed` and hand the error back to the caller. There
//! are no retries and no optimistic updates, so local state only ever reflects responses
//! the server actually returned.

pub mod auth;
pub mod tasks;
pub mod users;

pub use auth::AuthStore;
pub use tasks::TaskStore;
pub use users::UserStore;

use log::{debug, warn};
use std::future::Future;

use crate::error::ClientError;
use crate::models::Entity;

/// Status of a store's most recent action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StoreStatus {
    /// No action has run since construction or reset.
    #[default]
    Idle,
    /// An action is awaiting its response.
    Loading,
    /// The last action succeeded.
    Ready,
    /// The last action failed with this message.
    Failed(String),
}

impl StoreStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, StoreStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            StoreStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Runs one action: `Loading` while `action` is pending, then `Ready` or `Failed`.
    ///
    /// On failure the stored message is the server's, or `fallback` when it sent none,
    /// and the original error is returned unchanged.
    pub(crate) async fn track<T, F>(&mut self, fallback: &str, action: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        debug!("{}: started", fallback);
        *self = StoreStatus::Loading;
        match action.await {
            Ok(value) => {
                *self = StoreStatus::Ready;
                Ok(value)
            }
            Err(err) => {
                warn!("{}: {}", fallback, err);
                *self = StoreStatus::Failed(err.user_message(fallback));
                Err(err)
            }
        }
    }
}

/// A collection of entities plus the one currently selected.
///
/// Membership and selection are kept consistent: replacing an entity by id updates both
/// the collection entry and the selection when their ids match.
#[derive(Debug, Clone)]
pub struct EntityState<T> {
    items: Vec<T>,
    current: Option<T>,
    status: StoreStatus,
}

impl<T> Default for EntityState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current: None,
            status: StoreStatus::Idle,
        }
    }
}

impl<T: Entity> EntityState<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn status(&self) -> &StoreStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error()
    }

    pub(crate) fn status_mut(&mut self) -> &mut StoreStatus {
        &mut self.status
    }

    pub(crate) fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
    }

    pub(crate) fn append(&mut self, item: T) {
        self.items.push(item);
    }

    pub(crate) fn select(&mut self, item: T) {
        self.current = Some(item);
    }

    /// Replaces the entity with `id` in the collection and in the selection.
    /// Ids not present in the collection leave it untouched.
    pub(crate) fn replace(&mut self, id: i64, item: T) {
        if let Some(slot) = self.items.iter_mut().find(|existing| existing.id() == id) {
            *slot = item.clone();
        }
        if self.current.as_ref().is_some_and(|current| current.id() == id) {
            self.current = Some(item);
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
