use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use vida_feed::bus::{FeedSyncThread, InMemoryChain, TransactionSubmitter};
use vida_feed::{Feed, FeedConfig, PostId, StartBlock};

use crate::support::{init_tracing, like_payload, post_payload, wait_until, VIDA};

fn fast_config(start_block: StartBlock) -> FeedConfig {
    FeedConfig {
        start_block,
        poll_interval_ms: 5,
        ..FeedConfig::default()
    }
}

#[test]
fn converges_on_submitted_transactions() {
    init_tracing();
    let chain = InMemoryChain::new();
    let config = fast_config(StartBlock::At(0));
    let sync = FeedSyncThread::spawn(chain.clone(), Feed::new(&config), &config).unwrap();

    chain.submit(VIDA, post_payload(0, "A", "hi", 100), true).unwrap();
    chain.submit(VIDA, like_payload(0, "B", 101), true).unwrap();
    chain.submit(VIDA, like_payload(0, "B", 102), true).unwrap();
    chain.submit(VIDA, like_payload(0, "C", 103), true).unwrap();

    assert!(wait_until(|| sync
        .snapshot()
        .get(PostId(0))
        .map_or(false, |p| p.like_count() == 2)));

    let outcome = sync.stop().unwrap();
    assert_eq!(outcome.stats.transactions, 4);
    assert_eq!(outcome.stats.changes, 3);
    assert_eq!(outcome.feed.stats().duplicate_likes, 1);
}

#[test]
fn latest_start_skips_older_blocks() {
    let chain = InMemoryChain::new();
    chain.submit(VIDA, post_payload(0, "A", "old", 1), true).unwrap();
    chain.submit(VIDA, post_payload(1, "A", "older", 2), true).unwrap();
    chain.submit(VIDA, post_payload(2, "A", "tip", 3), true).unwrap();

    let config = fast_config(StartBlock::Latest);
    let sync = FeedSyncThread::spawn(chain.clone(), Feed::new(&config), &config).unwrap();

    chain.submit(VIDA, post_payload(3, "B", "new", 4), true).unwrap();
    assert!(wait_until(|| sync.snapshot().len() == 2));

    let ids: Vec<u64> = sync.snapshot().iter().map(|p| p.id().0).collect();
    assert_eq!(ids, vec![2, 3]);
    sync.stop().unwrap();
}

#[test]
fn redelivered_transactions_are_absorbed() {
    let chain = InMemoryChain::new();
    let config = fast_config(StartBlock::At(0));

    let mut feed = Feed::new(&config);
    let notified = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&notified);
    feed.on_state_change(move |_| *counter.lock().unwrap() += 1);

    let sync = FeedSyncThread::spawn(chain.clone(), feed, &config).unwrap();

    let post = chain.submit(VIDA, post_payload(0, "A", "hi", 1), true).unwrap();
    assert!(wait_until(|| sync.snapshot().len() == 1));

    assert!(chain.redeliver(&post.0));
    chain.submit(VIDA, like_payload(0, "B", 2), true).unwrap();
    assert!(wait_until(|| sync
        .snapshot()
        .get(PostId(0))
        .map_or(false, |p| p.like_count() == 1)));

    let outcome = sync.stop().unwrap();
    assert_eq!(outcome.stats.transactions, 3);
    assert_eq!(outcome.feed.stats().duplicate_posts, 1);
    assert_eq!(outcome.feed.snapshot().len(), 1);
    assert_eq!(*notified.lock().unwrap(), 2);
}

#[test]
fn resubscribes_after_disconnect() {
    init_tracing();
    let chain = InMemoryChain::new();
    let config = fast_config(StartBlock::At(0));
    let sync = FeedSyncThread::spawn(chain.clone(), Feed::new(&config), &config).unwrap();

    chain.submit(VIDA, post_payload(0, "A", "before", 1), true).unwrap();
    assert!(wait_until(|| sync.snapshot().len() == 1));

    chain.disconnect_subscribers();
    chain.submit(VIDA, post_payload(1, "B", "after", 2), true).unwrap();
    chain.submit(VIDA, like_payload(0, "B", 3), true).unwrap();

    assert!(wait_until(|| sync
        .snapshot()
        .get(PostId(0))
        .map_or(false, |p| p.like_count() == 1)));

    let outcome = sync.stop().unwrap();
    assert!(outcome.stats.errors >= 1);
    assert!(outcome.stats.resubscribes >= 1);

    let ids: Vec<u64> = outcome.feed.snapshot().iter().map(|p| p.id().0).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn other_vidas_never_reach_the_feed() {
    let chain = InMemoryChain::new();
    let config = fast_config(StartBlock::At(0));
    let sync = FeedSyncThread::spawn(chain.clone(), Feed::new(&config), &config).unwrap();

    chain.submit(VIDA + 1, post_payload(0, "X", "elsewhere", 1), true).unwrap();
    chain.submit(VIDA, post_payload(7, "A", "here", 2), true).unwrap();
    assert!(wait_until(|| sync.snapshot().len() == 1));

    thread::sleep(Duration::from_millis(20));
    let outcome = sync.stop().unwrap();
    assert_eq!(outcome.stats.transactions, 1);
    assert_eq!(outcome.feed.snapshot().posts()[0].id(), PostId(7));
}

#[test]
fn garbage_on_the_stream_is_counted_not_fatal() {
    let chain = InMemoryChain::new();
    let config = fast_config(StartBlock::At(0));
    let sync = FeedSyncThread::spawn(chain.clone(), Feed::new(&config), &config).unwrap();

    chain.submit(VIDA, b"\x00\x01 not a post".to_vec(), true).unwrap();
    chain.submit(VIDA, br#"{"type":"post","id":null}"#.to_vec(), true).unwrap();
    chain.submit(VIDA, post_payload(0, "A", "hi", 3), true).unwrap();
    assert!(wait_until(|| sync.snapshot().len() == 1));

    let outcome = sync.stop().unwrap();
    assert_eq!(outcome.stats.transactions, 3);
    assert_eq!(outcome.stats.errors, 0);
    assert_eq!(outcome.feed.stats().rejected, 2);
}
