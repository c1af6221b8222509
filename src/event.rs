use std::fmt;

use serde::{Deserialize, Serialize};

/// Author-assigned post identifier (previous max id + 1 on the author's side).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

impl PostId {
    /// The id an author would assign after `self`, or `None` once the id
    /// space is used up.
    pub fn next(self) -> Option<PostId> {
        self.0.checked_add(1).map(PostId)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        PostId(id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostCreated {
    pub id: PostId,
    pub sender: String,
    pub content: String,
    pub timestamp: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostLiked {
    pub post_id: PostId,
    pub sender: String,
    pub timestamp: i64,
}

/// A decoded feed transaction. The wire `type` discriminator only ever
/// produces one of these two variants; anything else is rejected by the decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    PostCreated(PostCreated),
    PostLiked(PostLiked),
}

impl FeedEvent {
    pub fn post(
        id: u64,
        sender: impl Into<String>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        FeedEvent::PostCreated(PostCreated {
            id: PostId(id),
            sender: sender.into(),
            content: content.into(),
            timestamp,
        })
    }

    pub fn like(post_id: u64, sender: impl Into<String>, timestamp: i64) -> Self {
        FeedEvent::PostLiked(PostLiked {
            post_id: PostId(post_id),
            sender: sender.into(),
            timestamp,
        })
    }

    /// The wire discriminator for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            FeedEvent::PostCreated(_) => "post",
            FeedEvent::PostLiked(_) => "like",
        }
    }

    pub fn sender(&self) -> &str {
        match self {
            FeedEvent::PostCreated(e) => &e.sender,
            FeedEvent::PostLiked(e) => &e.sender,
        }
    }

    /// Convert into the wire form submitted to the chain.
    ///
    /// `advisory_likes` is only written for likes; readers ignore it.
    pub fn to_wire(&self, advisory_likes: u64) -> WirePayload {
        match self {
            FeedEvent::PostCreated(e) => WirePayload::Post {
                post: e.content.clone(),
                timestamp: e.timestamp,
                sender: e.sender.clone(),
                id: e.id.0,
            },
            FeedEvent::PostLiked(e) => WirePayload::Like {
                likes: advisory_likes,
                post_id: e.post_id.0,
                timestamp: e.timestamp,
                sender: e.sender.clone(),
            },
        }
    }
}

/// Canonical JSON payload carried in a transaction's data field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WirePayload {
    Post {
        post: String,
        timestamp: i64,
        sender: String,
        id: u64,
    },
    Like {
        likes: u64,
        #[serde(rename = "postId")]
        post_id: u64,
        timestamp: i64,
        sender: String,
    },
}

impl WirePayload {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
