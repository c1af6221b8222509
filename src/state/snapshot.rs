use std::sync::Arc;

use serde::Serialize;

use crate::event::PostId;
use crate::post::Post;

/// An immutable, arrival-ordered view of the feed.
///
/// Cloning is cheap; the post list is shared with the state that produced it
/// until that state next changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    posts: Arc<Vec<Post>>,
}

impl Snapshot {
    pub(crate) fn new(posts: Arc<Vec<Post>>) -> Self {
        Self { posts }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Post> {
        self.posts.iter()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id() == id)
    }

    /// Highest post id seen so far.
    pub fn max_post_id(&self) -> Option<PostId> {
        self.posts.iter().map(Post::id).max()
    }

    /// The id an author posting on top of this view would assign. `None`
    /// when some post already holds the largest possible id.
    pub fn next_post_id(&self) -> Option<PostId> {
        match self.max_post_id() {
            Some(max) => max.next(),
            None => Some(PostId(0)),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Post;
    type IntoIter = std::slice::Iter<'a, Post>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
