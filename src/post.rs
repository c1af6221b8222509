use std::collections::BTreeSet;

use serde::Serialize;

use crate::event::{PostCreated, PostId};

/// A post admitted into the feed.
///
/// Everything but the like set is fixed at creation; `like_count` is always
/// the size of `liked_by`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    id: PostId,
    sender: String,
    content: String,
    timestamp: i64,
    like_count: u64,
    liked_by: BTreeSet<String>,
}

impl Post {
    pub(crate) fn from_event(event: &PostCreated) -> Self {
        Post {
            id: event.id,
            sender: event.sender.clone(),
            content: event.content.clone(),
            timestamp: event.timestamp,
            like_count: 0,
            liked_by: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> PostId {
        self.id
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    pub fn liked_by(&self) -> &BTreeSet<String> {
        &self.liked_by
    }

    pub fn is_liked_by(&self, sender: &str) -> bool {
        self.liked_by.contains(sender)
    }

    /// Record a like. Returns false if `sender` already liked this post.
    pub(crate) fn add_like(&mut self, sender: &str) -> bool {
        if !self.liked_by.insert(sender.to_string()) {
            return false;
        }
        self.like_count += 1;
        debug_assert_eq!(self.like_count as usize, self.liked_by.len());
        true
    }
}
