//! Fire-and-forget notifications of feed changes via `event-emitter-rs`.

mod feed_ext;

pub use feed_ext::{EmittableFeed, FeedEmitter, PAYLOAD_REJECTED, POST_CREATED, POST_LIKED};
