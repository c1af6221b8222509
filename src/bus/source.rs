//! Capability traits for reading from and writing to a vida transaction stream.

use std::error::Error;
use std::fmt;

use crate::transaction::Transaction;

/// Identifier returned by the network for a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl TxHash {
    /// Abbreviated form for display, e.g. `0x0000...00002a`.
    pub fn short(&self) -> String {
        let s = &self.0;
        if s.len() <= 12 || !s.is_ascii() {
            return s.clone();
        }
        format!("{}...{}", &s[..6], &s[s.len() - 6..])
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
pub enum SubscriptionError {
    /// The stream dropped; resubscribing may recover.
    Disconnected(String),
    LockPoisoned(&'static str),
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for SubscriptionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionError::Disconnected(msg) => write!(f, "subscription disconnected: {}", msg),
            SubscriptionError::LockPoisoned(op) => {
                write!(f, "transaction log lock poisoned during {}", op)
            }
            SubscriptionError::Other(e) => write!(f, "subscription error: {}", e),
        }
    }
}

impl Error for SubscriptionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SubscriptionError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum SubmitError {
    Rejected(String),
    Timeout,
    LockPoisoned(&'static str),
    Other(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Rejected(msg) => write!(f, "transaction rejected: {}", msg),
            SubmitError::Timeout => write!(f, "timed out waiting for finality"),
            SubmitError::LockPoisoned(op) => {
                write!(f, "transaction log lock poisoned during {}", op)
            }
            SubmitError::Other(e) => write!(f, "submit error: {}", e),
        }
    }
}

impl Error for SubmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SubmitError::Other(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// A live, pull-based stream of transactions for one vida id.
///
/// Transactions come back in network delivery order. The same transaction
/// may be delivered more than once.
pub trait TransactionSubscription: Send {
    /// Wait up to `timeout_ms` for the next transaction.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Transaction>, SubscriptionError>;
}

/// Something that can open subscriptions on the transaction stream.
pub trait TransactionSource: Send + Sync {
    type Subscription: TransactionSubscription;

    fn latest_block(&self) -> Result<u64, SubscriptionError>;

    /// Subscribe to every transaction tagged `vida_id` in block `from_block` or later.
    fn subscribe(
        &self,
        vida_id: u64,
        from_block: u64,
    ) -> Result<Self::Subscription, SubscriptionError>;
}

/// Submits opaque payloads to the network under a vida id.
pub trait TransactionSubmitter: Send + Sync {
    fn submit(
        &self,
        vida_id: u64,
        payload: Vec<u8>,
        await_finality: bool,
    ) -> Result<TxHash, SubmitError>;
}
