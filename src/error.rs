use std::fmt;

use crate::bus::{SubmitError, SubscriptionError};
use crate::config::ConfigError;
use crate::event::PostId;

/// Errors surfaced by the feed's outer layers (configuration, transport,
/// posting). Folding transactions into state never fails.
#[derive(Debug)]
pub enum FeedError {
    Config(ConfigError),
    Subscription(SubscriptionError),
    Submit(SubmitError),
    Encode(String),
    UnknownPost(PostId),
    /// A post on the chain already holds the largest id, so no new id can follow it.
    IdSpaceExhausted,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Config(e) => write!(f, "{}", e),
            FeedError::Subscription(e) => write!(f, "subscription error: {}", e),
            FeedError::Submit(e) => write!(f, "submit error: {}", e),
            FeedError::Encode(msg) => write!(f, "failed to encode payload: {}", msg),
            FeedError::UnknownPost(id) => write!(f, "post {} is not in the feed", id),
            FeedError::IdSpaceExhausted => write!(f, "no post id left after {}", u64::MAX),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Config(e) => Some(e),
            FeedError::Subscription(e) => Some(e),
            FeedError::Submit(e) => Some(e),
            FeedError::Encode(_) | FeedError::UnknownPost(_) | FeedError::IdSpaceExhausted => None,
        }
    }
}

impl From<ConfigError> for FeedError {
    fn from(e: ConfigError) -> Self {
        FeedError::Config(e)
    }
}

impl From<SubscriptionError> for FeedError {
    fn from(e: SubscriptionError) -> Self {
        FeedError::Subscription(e)
    }
}

impl From<SubmitError> for FeedError {
    fn from(e: SubmitError) -> Self {
        FeedError::Submit(e)
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Encode(e.to_string())
    }
}
