use event_emitter_rs::EventEmitter;
use serde_json::json;

use crate::decoder::DecodeError;
use crate::event::FeedEvent;
use crate::feed::{Feed, Ingested};
use crate::state::Applied;
use crate::transaction::Transaction;

pub const POST_CREATED: &str = "PostCreated";
pub const POST_LIKED: &str = "PostLiked";
pub const PAYLOAD_REJECTED: &str = "PayloadRejected";

/// Extension wrapper that broadcasts feed changes through an `EventEmitter`.
///
/// Listeners run on emitter threads, so unlike `Feed::on_state_change`
/// they are fire-and-forget and may observe events out of order.
///
/// # Example
///
/// ```ignore
/// use vida_feed::emitter::{EmittableFeed, POST_CREATED};
///
/// let mut feed = Feed::default().with_emitter();
///
/// feed.on(POST_CREATED, |post_json| {
///     println!("new post: {}", post_json);
/// });
///
/// feed.ingest(payload);
/// ```
pub struct FeedEmitter {
    feed: Feed,
    event_emitter: EventEmitter,
}

impl FeedEmitter {
    /// Wrap a feed with emitter capabilities.
    pub fn new(feed: Feed) -> Self {
        Self {
            feed,
            event_emitter: EventEmitter::new(),
        }
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut Feed {
        &mut self.feed
    }

    pub fn into_feed(self) -> Feed {
        self.feed
    }

    /// Register a listener for an event type. Payloads are JSON strings.
    pub fn on<F>(&mut self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.event_emitter.on(event, listener);
    }

    /// Ingest a raw payload and emit the resulting change, if any.
    pub fn ingest(&mut self, raw: &[u8]) -> Ingested {
        let outcome = self.feed.ingest(raw);
        self.emit_ingested(&outcome);
        outcome
    }

    /// Ingest a delivered transaction. Transactions for another vida are
    /// ignored and emit nothing.
    pub fn ingest_transaction(&mut self, tx: &Transaction) -> Ingested {
        let outcome = self.feed.ingest_transaction(tx);
        self.emit_ingested(&outcome);
        outcome
    }

    /// Apply a decoded event and emit the resulting change, if any.
    pub fn apply(&mut self, event: &FeedEvent) -> Applied {
        let applied = self.feed.apply(event);
        self.emit_applied(&applied);
        applied
    }

    fn emit_ingested(&mut self, outcome: &Ingested) {
        match outcome {
            Ingested::Applied(applied) => self.emit_applied(applied),
            Ingested::Rejected(err) => self.emit_rejected(err),
            Ingested::Foreign(_) => {}
        }
    }

    fn emit_applied(&mut self, applied: &Applied) {
        match *applied {
            Applied::Created(id) => {
                let Some(post) = self.feed.state().get(id) else {
                    return;
                };
                if let Ok(data) = serde_json::to_string(post) {
                    self.event_emitter.emit(POST_CREATED, data);
                }
            }
            Applied::Liked {
                post_id,
                like_count,
            } => {
                let data = json!({ "postId": post_id, "likeCount": like_count }).to_string();
                self.event_emitter.emit(POST_LIKED, data);
            }
            _ => {}
        }
    }

    fn emit_rejected(&mut self, err: &DecodeError) {
        self.event_emitter.emit(PAYLOAD_REJECTED, err.to_string());
    }
}

/// Trait for types that can be extended with emitter capabilities.
pub trait EmittableFeed {
    /// Wrap with emitter capabilities.
    fn with_emitter(self) -> FeedEmitter;
}

impl EmittableFeed for Feed {
    fn with_emitter(self) -> FeedEmitter {
        FeedEmitter::new(self)
    }
}
