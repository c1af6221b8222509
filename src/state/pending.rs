//! Likes held back until their post arrives.

use std::collections::HashMap;

use crate::event::{PostId, PostLiked};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Hold {
    Held,
    AlreadyHeld,
    Full,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PendingLikes {
    by_post: HashMap<PostId, Vec<PostLiked>>,
    total: usize,
}

impl PendingLikes {
    pub(crate) fn hold(&mut self, like: &PostLiked, max_pending: usize) -> Hold {
        let queued = self.by_post.get(&like.post_id);
        if queued.is_some_and(|likes| likes.iter().any(|l| l.sender == like.sender)) {
            return Hold::AlreadyHeld;
        }
        if self.total >= max_pending {
            return Hold::Full;
        }
        self.by_post
            .entry(like.post_id)
            .or_default()
            .push(like.clone());
        self.total += 1;
        Hold::Held
    }

    /// Remove and return the likes held for `id`, in arrival order.
    pub(crate) fn take(&mut self, id: PostId) -> Vec<PostLiked> {
        let likes = self.by_post.remove(&id).unwrap_or_default();
        self.total -= likes.len();
        likes
    }

    pub(crate) fn len(&self) -> usize {
        self.total
    }
}
