//! Transaction plumbing - the feed's view of the network.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  FeedSyncThread (per feed)                   │
//! │  - Owns the Feed while running                              │
//! │  - subscribe() / poll() / resubscribe on disconnect         │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │         TransactionSource + TransactionSubmitter             │
//! │  Source: latest_block() / subscribe(vida_id, from_block)    │
//! │  Subscription: poll(timeout)                                │
//! │  Submitter: submit(vida_id, payload, await_finality)        │
//! └─────────────────────────────────────────────────────────────┘
//!          │                                │
//!          ▼                                ▼
//! ┌─────────────────┐            ┌──────────────────────────┐
//! │  InMemoryChain  │            │  RPC / wallet transports │
//! │   (included)    │            │        (external)        │
//! └─────────────────┘            └──────────────────────────┘
//! ```

#[cfg(feature = "bus")]
mod in_memory_chain;
mod source;
#[cfg(feature = "bus")]
mod sync_thread;

#[cfg(feature = "bus")]
pub use in_memory_chain::{ChainSubscription, InMemoryChain};
pub use source::{
    SubmitError, SubscriptionError, TransactionSource, TransactionSubmitter,
    TransactionSubscription, TxHash,
};
#[cfg(feature = "bus")]
pub use sync_thread::{FeedSyncThread, SyncOutcome, SyncStats};
