//! The feed: decoder and reducer behind one ingest point.
//!
//! A `Feed` takes raw transaction payloads in delivery order, drops anything
//! that does not decode, folds the rest into its [`FeedState`], and pushes a
//! fresh [`Snapshot`] to every registered listener after each change.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::FeedConfig;
use crate::decoder::{decode, DecodeError};
use crate::event::FeedEvent;
use crate::state::{Applied, FeedState, Snapshot};
use crate::transaction::Transaction;

type StateListener = Box<dyn Fn(&Snapshot) + Send + Sync>;

/// What happened to one ingested payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ingested {
    Applied(Applied),
    Rejected(DecodeError),
    /// The transaction carries a different vida id.
    Foreign(u64),
}

impl Ingested {
    pub fn changed(&self) -> bool {
        matches!(self, Ingested::Applied(applied) if applied.changed())
    }
}

/// Running counters over everything the feed has been handed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub received: u64,
    pub rejected: u64,
    pub foreign: u64,
    pub created: u64,
    pub liked: u64,
    pub duplicate_posts: u64,
    pub duplicate_likes: u64,
    pub orphan_likes: u64,
    pub buffered_likes: u64,
}

impl IngestStats {
    fn record(&mut self, applied: &Applied) {
        match applied {
            Applied::Created(_) => self.created += 1,
            Applied::Liked { .. } => self.liked += 1,
            Applied::DuplicatePost(_) => self.duplicate_posts += 1,
            Applied::DuplicateLike(_) => self.duplicate_likes += 1,
            Applied::OrphanLike(_) => self.orphan_likes += 1,
            Applied::Buffered(_) => self.buffered_likes += 1,
        }
    }
}

pub struct Feed {
    vida_id: u64,
    state: FeedState,
    listeners: Vec<StateListener>,
    stats: IngestStats,
}

impl fmt::Debug for Feed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feed")
            .field("vida_id", &self.vida_id)
            .field("posts", &self.state.len())
            .field("listeners", &self.listeners.len())
            .field("stats", &self.stats)
            .finish()
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new(&FeedConfig::default())
    }
}

impl Feed {
    pub fn new(config: &FeedConfig) -> Self {
        Feed {
            vida_id: config.vida_id,
            state: FeedState::with_policy(config.orphan_likes),
            listeners: Vec::new(),
            stats: IngestStats::default(),
        }
    }

    pub fn vida_id(&self) -> u64 {
        self.vida_id
    }

    /// Register a listener called with the new snapshot after every change.
    ///
    /// Listeners run synchronously on the ingesting thread, in registration
    /// order, so they observe changes in exactly the order they were applied.
    pub fn on_state_change<F>(&mut self, listener: F)
    where
        F: Fn(&Snapshot) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Decode and fold one raw payload. Undecodable payloads are dropped.
    pub fn ingest(&mut self, raw: &[u8]) -> Ingested {
        self.stats.received += 1;
        match decode(raw) {
            Ok(event) => Ingested::Applied(self.fold(&event)),
            Err(err) => {
                self.stats.rejected += 1;
                debug!(error = %err, "dropping undecodable feed payload");
                Ingested::Rejected(err)
            }
        }
    }

    /// Ingest a delivered transaction, ignoring ones tagged for another vida.
    pub fn ingest_transaction(&mut self, tx: &Transaction) -> Ingested {
        if tx.vida_id != self.vida_id {
            self.stats.foreign += 1;
            debug!(hash = %tx.hash, vida_id = tx.vida_id, "ignoring transaction for another vida");
            return Ingested::Foreign(tx.vida_id);
        }
        let outcome = self.ingest(tx.payload());
        trace!(hash = %tx.hash, block = tx.block_number, ?outcome, "ingested transaction");
        outcome
    }

    /// Fold an already-decoded event.
    pub fn apply(&mut self, event: &FeedEvent) -> Applied {
        self.fold(event)
    }

    fn fold(&mut self, event: &FeedEvent) -> Applied {
        let applied = self.state.apply(event);
        self.stats.record(&applied);

        if applied.changed() {
            trace!(?applied, "feed changed");
            self.notify();
        } else {
            debug!(?applied, sender = event.sender(), "feed event was a no-op");
        }
        applied
    }

    fn notify(&self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.state.snapshot();
        for listener in &self.listeners {
            listener(&snapshot);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Drop all posts before a fresh subscription replays history.
    /// Listeners and stats are kept.
    pub fn reset(&mut self) {
        let was_empty = self.state.is_empty();
        self.state.reset();
        if !was_empty {
            self.notify();
        }
    }
}
