//! Posting and liking: builds wire payloads from the current feed view and
//! hands them to a [`TransactionSubmitter`].

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use crate::bus::{TransactionSubmitter, TxHash};
use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::event::{FeedEvent, PostId};
use crate::state::Snapshot;

pub struct FeedClient<S> {
    submitter: S,
    vida_id: u64,
    await_finality: bool,
}

impl<S: TransactionSubmitter> FeedClient<S> {
    pub fn new(submitter: S, config: &FeedConfig) -> Self {
        FeedClient {
            submitter,
            vida_id: config.vida_id,
            await_finality: config.await_finality,
        }
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Publish a new post. Its id is one past the highest id in `snapshot`.
    pub fn post(&self, snapshot: &Snapshot, sender: &str, content: &str) -> Result<TxHash, FeedError> {
        self.post_at(snapshot, sender, content, now_millis())
    }

    pub fn post_at(
        &self,
        snapshot: &Snapshot,
        sender: &str,
        content: &str,
        timestamp: i64,
    ) -> Result<TxHash, FeedError> {
        let id = snapshot.next_post_id().ok_or(FeedError::IdSpaceExhausted)?;
        let event = FeedEvent::post(id.0, sender, content, timestamp);
        let hash = self.submit(&event, 0)?;
        info!(post_id = %id, hash = %hash.short(), "sent post");
        Ok(hash)
    }

    /// Like a post visible in `snapshot`.
    pub fn like(&self, snapshot: &Snapshot, sender: &str, post_id: PostId) -> Result<TxHash, FeedError> {
        self.like_at(snapshot, sender, post_id, now_millis())
    }

    pub fn like_at(
        &self,
        snapshot: &Snapshot,
        sender: &str,
        post_id: PostId,
        timestamp: i64,
    ) -> Result<TxHash, FeedError> {
        let post = snapshot.get(post_id).ok_or(FeedError::UnknownPost(post_id))?;
        let event = FeedEvent::like(post_id.0, sender, timestamp);
        let hash = self.submit(&event, post.like_count() + 1)?;
        info!(post_id = %post_id, hash = %hash.short(), "sent like");
        Ok(hash)
    }

    fn submit(&self, event: &FeedEvent, advisory_likes: u64) -> Result<TxHash, FeedError> {
        let payload = event.to_wire(advisory_likes).to_bytes()?;
        Ok(self
            .submitter
            .submit(self.vida_id, payload, self.await_finality)?)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
