pub mod bus;
mod client;
mod config;
mod decoder;
mod error;
mod event;
mod feed;
mod post;
mod state;
mod transaction;

#[cfg(feature = "emitter")]
pub mod emitter;

pub use client::FeedClient;
pub use config::{ConfigError, FeedConfig, StartBlock, DEFAULT_RPC_URL, DEFAULT_VIDA_ID};
pub use decoder::{decode, DecodeError};
pub use error::FeedError;
pub use event::{FeedEvent, PostCreated, PostId, PostLiked, WirePayload};
pub use feed::{Feed, IngestStats, Ingested};
pub use post::Post;
pub use state::{Applied, FeedState, OrphanLikePolicy, Snapshot};
pub use transaction::Transaction;
