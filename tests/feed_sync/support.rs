//! Shared helpers for the feed sync tests.

#![allow(dead_code)]

use std::thread;
use std::time::{Duration, Instant};

use serde_json::json;

pub const VIDA: u64 = 5544;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn post_payload(id: u64, sender: &str, content: &str, timestamp: i64) -> Vec<u8> {
    json!({
        "type": "post",
        "post": content,
        "timestamp": timestamp,
        "sender": sender,
        "id": id
    })
    .to_string()
    .into_bytes()
}

pub fn like_payload(post_id: u64, sender: &str, timestamp: i64) -> Vec<u8> {
    json!({
        "type": "like",
        "likes": 1,
        "postId": post_id,
        "timestamp": timestamp,
        "sender": sender
    })
    .to_string()
    .into_bytes()
}

/// Poll `check` until it holds or two seconds pass.
pub fn wait_until<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    check()
}
