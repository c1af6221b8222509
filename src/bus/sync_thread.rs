//! Background thread that keeps a feed in sync with a transaction stream.

use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{info, warn};

use super::{SubscriptionError, TransactionSource, TransactionSubscription};
use crate::config::{FeedConfig, StartBlock};
use crate::feed::Feed;
use crate::state::Snapshot;

/// Statistics from the sync thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub polls: usize,
    pub transactions: usize,
    pub changes: usize,
    pub errors: usize,
    pub resubscribes: usize,
}

/// What a stopped sync thread hands back.
#[derive(Debug)]
pub struct SyncOutcome {
    pub feed: Feed,
    pub stats: SyncStats,
}

/// A background thread that drains a subscription into a [`Feed`].
///
/// The thread owns the feed while it runs, so every transaction is folded by
/// exactly one consumer in delivery order. When the subscription drops, the
/// thread resubscribes from the block of the last transaction it saw; the
/// replayed transactions are absorbed by the feed as duplicates.
///
/// ## Example
///
/// ```ignore
/// use vida_feed::bus::{FeedSyncThread, InMemoryChain};
/// use vida_feed::{Feed, FeedConfig};
///
/// let chain = InMemoryChain::new();
/// let config = FeedConfig::default();
/// let mut feed = Feed::new(&config);
/// feed.on_state_change(|snapshot| render(snapshot));
///
/// let sync = FeedSyncThread::spawn(chain.clone(), feed, &config)?;
/// // ... submit posts ...
/// let outcome = sync.stop().expect("sync thread panicked");
/// println!("Folded {} transactions", outcome.stats.transactions);
/// ```
pub struct FeedSyncThread {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<SyncOutcome>>,
    latest: Arc<Mutex<Snapshot>>,
}

impl FeedSyncThread {
    /// Open a subscription at the configured start block and start syncing.
    ///
    /// Only the initial subscribe can fail; later stream errors are retried
    /// on the thread.
    pub fn spawn<S>(source: S, mut feed: Feed, config: &FeedConfig) -> Result<Self, SubscriptionError>
    where
        S: TransactionSource + 'static,
        S::Subscription: 'static,
    {
        let vida_id = config.vida_id;
        let from_block = match config.start_block {
            StartBlock::Latest => source.latest_block()?,
            StartBlock::At(block) => block,
        };
        let mut subscription = source.subscribe(vida_id, from_block)?;
        info!(vida_id, from_block, "subscribed to vida transactions");

        let latest = Arc::new(Mutex::new(feed.snapshot()));
        let sink = Arc::clone(&latest);
        feed.on_state_change(move |snapshot| {
            if let Ok(mut latest) = sink.lock() {
                *latest = snapshot.clone();
            }
        });

        let poll_ms = config.poll_interval_ms.max(1);
        let poll_interval = Duration::from_millis(poll_ms);
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = SyncStats::default();
            let mut resume_from = from_block;

            loop {
                match stop_rx.try_recv() {
                    Ok(()) | Err(TryRecvError::Disconnected) => break,
                    Err(TryRecvError::Empty) => {}
                }

                stats.polls += 1;

                match subscription.poll(poll_ms) {
                    Ok(Some(tx)) => {
                        resume_from = tx.block_number;
                        stats.transactions += 1;
                        if feed.ingest_transaction(&tx).changed() {
                            stats.changes += 1;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        stats.errors += 1;
                        warn!("vida subscription failed: {err}");
                        match source.subscribe(vida_id, resume_from) {
                            Ok(fresh) => {
                                subscription = fresh;
                                stats.resubscribes += 1;
                                info!(vida_id, from_block = resume_from, "resubscribed to vida transactions");
                            }
                            Err(err) => {
                                warn!("vida resubscribe failed: {err}");
                                thread::sleep(poll_interval);
                            }
                        }
                    }
                }
            }

            info!(
                transactions = stats.transactions,
                changes = stats.changes,
                "feed sync stopped"
            );
            SyncOutcome { feed, stats }
        });

        Ok(Self {
            stop_tx,
            handle: Some(handle),
            latest,
        })
    }

    /// The snapshot pushed by the most recent change.
    pub fn snapshot(&self) -> Snapshot {
        self.latest
            .lock()
            .map(|snapshot| snapshot.clone())
            .unwrap_or_default()
    }

    /// Signal the thread to stop and wait for it to finish.
    ///
    /// Returns `None` if the thread panicked (for example inside a listener).
    pub fn stop(mut self) -> Option<SyncOutcome> {
        let _ = self.stop_tx.send(());
        self.handle.take().and_then(|handle| handle.join().ok())
    }

    /// Signal the thread to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for FeedSyncThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        // Don't join on drop - let the thread finish naturally
    }
}
