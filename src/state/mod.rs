//! Feed state reducer.
//!
//! Folds decoded feed events, one at a time and in delivery order, into an
//! arrival-ordered list of posts. Every input is either a state transition or
//! a no-op:
//!
//! - a `PostCreated` whose id is already known is ignored, so replayed
//!   subscriptions never duplicate posts;
//! - a `PostLiked` from a sender already in the post's like set is ignored;
//! - a `PostLiked` for an unknown post is dropped, or held until the post
//!   arrives when [`OrphanLikePolicy::Buffer`] is configured.
//!
//! ```
//! use vida_feed::{Applied, FeedEvent, FeedState, PostId};
//!
//! let mut state = FeedState::new();
//! state.apply(&FeedEvent::post(0, "A", "hi", 100));
//! state.apply(&FeedEvent::like(0, "B", 101));
//! assert_eq!(state.apply(&FeedEvent::like(0, "B", 102)), Applied::DuplicateLike(PostId(0)));
//!
//! let snapshot = state.snapshot();
//! assert_eq!(snapshot.posts()[0].like_count(), 1);
//! ```

mod pending;
mod snapshot;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::event::{FeedEvent, PostCreated, PostId, PostLiked};
use crate::post::Post;
use pending::{Hold, PendingLikes};

pub use snapshot::Snapshot;

/// What to do with a like whose post has not been seen yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanLikePolicy {
    /// Drop it. A later `PostCreated` starts with zero likes.
    #[default]
    Drop,
    /// Hold up to `max_pending` likes (across all posts) and apply them when
    /// the post is created. Likes arriving while the buffer is full are dropped.
    Buffer { max_pending: usize },
}

/// Outcome of applying one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Created(PostId),
    Liked { post_id: PostId, like_count: u64 },
    DuplicatePost(PostId),
    DuplicateLike(PostId),
    OrphanLike(PostId),
    Buffered(PostId),
}

impl Applied {
    /// Whether the visible feed changed.
    pub fn changed(&self) -> bool {
        matches!(self, Applied::Created(_) | Applied::Liked { .. })
    }

    pub fn post_id(&self) -> PostId {
        match *self {
            Applied::Created(id)
            | Applied::DuplicatePost(id)
            | Applied::DuplicateLike(id)
            | Applied::OrphanLike(id)
            | Applied::Buffered(id) => id,
            Applied::Liked { post_id, .. } => post_id,
        }
    }
}

/// Canonical post state: arrival-ordered posts plus an id index.
///
/// Not synchronized; drive it from a single consumer.
#[derive(Clone, Debug, Default)]
pub struct FeedState {
    posts: Arc<Vec<Post>>,
    index: HashMap<PostId, usize>,
    max_id: Option<PostId>,
    orphan_likes: OrphanLikePolicy,
    pending: PendingLikes,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(orphan_likes: OrphanLikePolicy) -> Self {
        Self {
            orphan_likes,
            ..Self::default()
        }
    }

    pub fn orphan_like_policy(&self) -> OrphanLikePolicy {
        self.orphan_likes
    }

    /// Fold one event into the state.
    pub fn apply(&mut self, event: &FeedEvent) -> Applied {
        match event {
            FeedEvent::PostCreated(created) => self.create(created),
            FeedEvent::PostLiked(liked) => self.like(liked),
        }
    }

    fn create(&mut self, created: &PostCreated) -> Applied {
        if self.index.contains_key(&created.id) {
            return Applied::DuplicatePost(created.id);
        }

        let mut post = Post::from_event(created);
        for held in self.pending.take(created.id) {
            post.add_like(&held.sender);
        }

        let posts = Arc::make_mut(&mut self.posts);
        self.index.insert(created.id, posts.len());
        posts.push(post);
        self.max_id = Some(self.max_id.map_or(created.id, |max| max.max(created.id)));

        Applied::Created(created.id)
    }

    fn like(&mut self, liked: &PostLiked) -> Applied {
        let Some(&slot) = self.index.get(&liked.post_id) else {
            return self.hold_orphan(liked);
        };

        // Check before make_mut so duplicates never copy a shared post list.
        if self.posts[slot].is_liked_by(&liked.sender) {
            return Applied::DuplicateLike(liked.post_id);
        }

        let post = &mut Arc::make_mut(&mut self.posts)[slot];
        post.add_like(&liked.sender);

        Applied::Liked {
            post_id: liked.post_id,
            like_count: post.like_count(),
        }
    }

    fn hold_orphan(&mut self, liked: &PostLiked) -> Applied {
        match self.orphan_likes {
            OrphanLikePolicy::Drop => Applied::OrphanLike(liked.post_id),
            OrphanLikePolicy::Buffer { max_pending } => {
                match self.pending.hold(liked, max_pending) {
                    Hold::Held => Applied::Buffered(liked.post_id),
                    Hold::AlreadyHeld => Applied::DuplicateLike(liked.post_id),
                    Hold::Full => Applied::OrphanLike(liked.post_id),
                }
            }
        }
    }

    /// The current arrival-ordered view.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(Arc::clone(&self.posts))
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.index.get(&id).map(|&slot| &self.posts[slot])
    }

    pub fn contains(&self, id: PostId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn max_post_id(&self) -> Option<PostId> {
        self.max_id
    }

    /// Likes currently held for posts not yet seen.
    pub fn pending_likes(&self) -> usize {
        self.pending.len()
    }

    /// Discard all posts and held likes, keeping the orphan-like policy.
    pub fn reset(&mut self) {
        *self = Self::with_policy(self.orphan_likes);
    }
}
