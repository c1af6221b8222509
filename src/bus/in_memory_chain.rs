//! In-memory transaction stream for testing and single-process use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

use super::{
    SubmitError, SubscriptionError, TransactionSource, TransactionSubmitter,
    TransactionSubscription, TxHash,
};
use crate::transaction::Transaction;

/// In-memory stand-in for the vida transaction network.
///
/// Features:
/// - Clone-friendly; clones share the same delivery log
/// - One block per submitted transaction
/// - Each subscription keeps its own read position and filters by vida id
/// - Re-delivery and dropped connections can be forced for tests
///
/// ## Example
///
/// ```
/// use vida_feed::bus::{InMemoryChain, TransactionSource, TransactionSubmitter, TransactionSubscription};
///
/// let chain = InMemoryChain::new();
/// chain.submit(5544, br#"{"type":"post","id":0}"#.to_vec(), true).unwrap();
///
/// let sub = chain.subscribe(5544, 0).unwrap();
/// let tx = sub.poll(10).unwrap().unwrap();
/// assert_eq!(tx.block_number, 1);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryChain {
    /// Delivery log; may hold the same transaction more than once
    log: Arc<RwLock<Vec<Transaction>>>,
    height: Arc<AtomicU64>,
    /// Bumped to drop every open subscription
    epoch: Arc<AtomicU64>,
}

impl InMemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mine a block holding one transaction and return it.
    pub fn append(&self, vida_id: u64, sender: &str, data: Vec<u8>) -> Result<Transaction, SubmitError> {
        let mut log = self
            .log
            .write()
            .map_err(|_| SubmitError::LockPoisoned("append"))?;
        let block = self.height.fetch_add(1, Ordering::SeqCst) + 1;
        let tx = Transaction::new(format!("0x{:064x}", block), block, vida_id, data)
            .with_sender(sender);
        log.push(tx.clone());
        Ok(tx)
    }

    /// Deliver an already-mined transaction again.
    pub fn redeliver(&self, hash: &str) -> bool {
        let Ok(mut log) = self.log.write() else {
            return false;
        };
        match log.iter().find(|tx| tx.hash == hash).cloned() {
            Some(tx) => {
                log.push(tx);
                true
            }
            None => false,
        }
    }

    /// Make every currently open subscription fail with `Disconnected`.
    pub fn disconnect_subscribers(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Every delivery so far, in order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.log.read().map(|log| log.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransactionSubmitter for InMemoryChain {
    /// Blocks are final as soon as they are appended, so `await_finality`
    /// makes no difference here.
    fn submit(
        &self,
        vida_id: u64,
        payload: Vec<u8>,
        _await_finality: bool,
    ) -> Result<TxHash, SubmitError> {
        let tx = self.append(vida_id, "", payload)?;
        debug!(hash = %tx.hash, vida_id, "submitted transaction");
        Ok(TxHash(tx.hash))
    }
}

impl TransactionSource for InMemoryChain {
    type Subscription = ChainSubscription;

    fn latest_block(&self) -> Result<u64, SubscriptionError> {
        Ok(self.height.load(Ordering::SeqCst))
    }

    fn subscribe(&self, vida_id: u64, from_block: u64) -> Result<ChainSubscription, SubscriptionError> {
        Ok(ChainSubscription {
            log: Arc::clone(&self.log),
            chain_epoch: Arc::clone(&self.epoch),
            epoch: self.epoch.load(Ordering::SeqCst),
            vida_id,
            from_block,
            position: Mutex::new(0),
        })
    }
}

/// A subscription on an [`InMemoryChain`].
pub struct ChainSubscription {
    log: Arc<RwLock<Vec<Transaction>>>,
    chain_epoch: Arc<AtomicU64>,
    epoch: u64,
    vida_id: u64,
    from_block: u64,
    position: Mutex<usize>,
}

impl ChainSubscription {
    fn next_matching(&self) -> Result<Option<Transaction>, SubscriptionError> {
        let log = self
            .log
            .read()
            .map_err(|_| SubscriptionError::LockPoisoned("poll"))?;
        let mut pos = self
            .position
            .lock()
            .map_err(|_| SubscriptionError::LockPoisoned("poll"))?;

        while *pos < log.len() {
            let tx = &log[*pos];
            *pos += 1;
            if tx.vida_id == self.vida_id && tx.block_number >= self.from_block {
                return Ok(Some(tx.clone()));
            }
        }
        Ok(None)
    }
}

impl TransactionSubscription for ChainSubscription {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Transaction>, SubscriptionError> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            if self.chain_epoch.load(Ordering::SeqCst) != self.epoch {
                return Err(SubscriptionError::Disconnected("chain dropped subscribers".into()));
            }

            if let Some(tx) = self.next_matching()? {
                return Ok(Some(tx));
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}
