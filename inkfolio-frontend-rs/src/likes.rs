//! Device-local record of which tattoos this browser has already liked.
//!
//! The ledger is the only gate for the like gesture. A tattoo can be liked at
//! most once per browser: once from the persisted set, and at most one request
//! at a time from the in-flight set. The persisted set only grows when the
//! server confirms the like.

use keepsake::{PersistedSet, StorageBackend};
use std::cell::RefCell;
use std::collections::HashSet;

pub const LIKED_TATTOOS_KEY: &str = "inkfolio_liked_tattoos";

/// Outcome of asking the ledger to start a like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LikeAttempt {
    /// Not liked and not in flight; the caller owns the request now.
    Started,
    /// Already confirmed on this device.
    AlreadyLiked,
    /// A request for this id is still awaiting its response.
    InFlight,
}

pub struct LikeLedger<B> {
    persisted: PersistedSet<B>,
    pending: RefCell<HashSet<String>>,
}

impl<B: StorageBackend> LikeLedger<B> {
    pub fn new(backend: B) -> Self {
        Self {
            persisted: PersistedSet::new(backend, LIKED_TATTOOS_KEY),
            pending: RefCell::new(HashSet::new()),
        }
    }

    /// Confirmed likes only. An in-flight like does not show as liked.
    pub fn is_liked(&self, id: &str) -> bool {
        self.persisted.contains(id)
    }

    pub fn liked_ids(&self) -> Vec<String> {
        self.persisted.load_all()
    }

    /// Claim the like for `id`. On [`LikeAttempt::Started`] the caller must
    /// later call exactly one of [`commit`](Self::commit) or
    /// [`abort`](Self::abort).
    pub fn begin(&self, id: &str) -> LikeAttempt {
        if self.persisted.contains(id) {
            return LikeAttempt::AlreadyLiked;
        }
        if !self.pending.borrow_mut().insert(id.to_string()) {
            return LikeAttempt::InFlight;
        }
        LikeAttempt::Started
    }

    /// The server accepted the like; persist it.
    pub fn commit(&self, id: &str) {
        self.pending.borrow_mut().remove(id);
        self.persisted.insert(id);
    }

    /// The request failed; the gesture may be retried later.
    pub fn abort(&self, id: &str) {
        self.pending.borrow_mut().remove(id);
    }
}
