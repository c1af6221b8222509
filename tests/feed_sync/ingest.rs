use std::sync::{Arc, Mutex};

use vida_feed::{
    Applied, DecodeError, Feed, FeedConfig, Ingested, OrphanLikePolicy, PostId, Transaction,
};

use crate::support::{init_tracing, like_payload, post_payload, VIDA};

#[test]
fn double_like_counts_once() {
    init_tracing();
    let mut feed = Feed::default();

    feed.ingest(&post_payload(0, "A", "hi", 100));
    feed.ingest(&like_payload(0, "B", 101));
    feed.ingest(&like_payload(0, "B", 102));
    feed.ingest(&like_payload(0, "C", 103));

    let snapshot = feed.snapshot();
    assert_eq!(snapshot.len(), 1);
    let post = &snapshot.posts()[0];
    assert_eq!(post.id(), PostId(0));
    assert_eq!(post.like_count(), 2);
    let liked_by: Vec<&str> = post.liked_by().iter().map(String::as_str).collect();
    assert_eq!(liked_by, vec!["B", "C"]);
}

#[test]
fn like_before_post_is_not_applied_later() {
    let mut feed = Feed::default();

    let early = feed.ingest(&like_payload(5, "B", 100));
    assert_eq!(early, Ingested::Applied(Applied::OrphanLike(PostId(5))));
    assert!(feed.snapshot().is_empty());

    feed.ingest(&post_payload(5, "A", "late", 101));
    let snapshot = feed.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.posts()[0].like_count(), 0);
}

#[test]
fn replayed_post_appears_once() {
    let mut feed = Feed::default();

    feed.ingest(&post_payload(0, "A", "hi", 100));
    let replay = feed.ingest(&post_payload(0, "A", "hi", 100));

    assert_eq!(replay, Ingested::Applied(Applied::DuplicatePost(PostId(0))));
    assert_eq!(feed.snapshot().len(), 1);
    assert_eq!(feed.stats().duplicate_posts, 1);
}

#[test]
fn arrival_order_ignores_ids_and_timestamps() {
    let mut feed = Feed::default();

    feed.ingest(&post_payload(7, "A", "first", 900));
    feed.ingest(&post_payload(2, "B", "second", 100));
    feed.ingest(&post_payload(4, "C", "third", 500));

    let ids: Vec<u64> = feed.snapshot().iter().map(|p| p.id().0).collect();
    assert_eq!(ids, vec![7, 2, 4]);
}

#[test]
fn malformed_payloads_are_dropped_quietly() {
    let mut feed = Feed::default();
    let changes = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&changes);
    feed.on_state_change(move |_| *counter.lock().unwrap() += 1);

    let rejected: [&[u8]; 5] = [
        b"not json",
        br#"{"post":"no type","id":1}"#,
        br#"{"type":"post","post":"null id","id":null}"#,
        br#"{"type":"repost","id":1}"#,
        &[0xff, 0xfe, 0x00],
    ];
    for raw in rejected {
        assert!(matches!(feed.ingest(raw), Ingested::Rejected(_)));
    }

    assert!(feed.snapshot().is_empty());
    assert_eq!(*changes.lock().unwrap(), 0);
    assert_eq!(feed.stats().rejected, 5);
    assert_eq!(feed.stats().received, 5);
}

#[test]
fn unknown_type_reports_discriminator() {
    let mut feed = Feed::default();
    let outcome = feed.ingest(br#"{"type":"Repost","id":1}"#);
    assert_eq!(
        outcome,
        Ingested::Rejected(DecodeError::UnknownType("Repost".into()))
    );
}

#[test]
fn listeners_see_every_change_in_order() {
    let mut feed = Feed::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    feed.on_state_change(move |snapshot| {
        let total: u64 = snapshot.iter().map(|p| p.like_count()).sum();
        sink.lock().unwrap().push((snapshot.len(), total));
    });

    feed.ingest(&post_payload(0, "A", "hi", 1));
    feed.ingest(&like_payload(0, "B", 2));
    feed.ingest(&like_payload(0, "B", 3));
    feed.ingest(&post_payload(1, "B", "yo", 4));
    feed.ingest(&like_payload(9, "C", 5));

    assert_eq!(*seen.lock().unwrap(), vec![(1, 0), (1, 1), (2, 1)]);
}

#[test]
fn hex_transactions_fold_like_raw_payloads() {
    let mut feed = Feed::default();

    let post = Transaction::from_hex("0xaa", 10, VIDA, &hex::encode(post_payload(0, "A", "hi", 1)))
        .unwrap();
    let like = Transaction::from_hex(
        "0xbb",
        11,
        VIDA,
        &format!("0x{}", hex::encode(like_payload(0, "B", 2))),
    )
    .unwrap();

    assert!(feed.ingest_transaction(&post).changed());
    assert!(feed.ingest_transaction(&like).changed());
    assert_eq!(feed.snapshot().posts()[0].like_count(), 1);
}

#[test]
fn transactions_for_other_vidas_are_ignored() {
    let mut feed = Feed::default();
    let tx = Transaction::new("0xcc", 3, 1, post_payload(0, "A", "elsewhere", 1));

    assert_eq!(feed.ingest_transaction(&tx), Ingested::Foreign(1));
    assert!(feed.snapshot().is_empty());
    assert_eq!(feed.stats().foreign, 1);
}

#[test]
fn transaction_json_round_trips_hex_data() {
    let tx = Transaction::new("0xdd", 4, VIDA, post_payload(3, "A", "hi", 1));
    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["blockNumber"], 4);
    assert_eq!(json["vidaId"], VIDA);

    let back: Transaction = serde_json::from_value(json).unwrap();
    let mut feed = Feed::default();
    feed.ingest_transaction(&back);
    assert_eq!(feed.snapshot().posts()[0].id(), PostId(3));
}

#[test]
fn buffered_orphan_likes_apply_when_post_arrives() {
    let config = FeedConfig::from_json_str(
        r#"{ "orphan_likes": { "buffer": { "max_pending": 8 } } }"#,
    )
    .unwrap();
    assert_eq!(
        config.orphan_likes,
        OrphanLikePolicy::Buffer { max_pending: 8 }
    );
    let mut feed = Feed::new(&config);

    assert_eq!(
        feed.ingest(&like_payload(5, "B", 1)),
        Ingested::Applied(Applied::Buffered(PostId(5)))
    );
    feed.ingest(&like_payload(5, "B", 2));
    feed.ingest(&like_payload(5, "C", 3));
    assert_eq!(feed.state().pending_likes(), 2);

    feed.ingest(&post_payload(5, "A", "late", 4));
    let snapshot = feed.snapshot();
    assert_eq!(snapshot.posts()[0].like_count(), 2);
    assert_eq!(feed.state().pending_likes(), 0);
}

#[test]
fn snapshot_serializes_for_presentation() {
    let mut feed = Feed::default();
    feed.ingest(&post_payload(0, "A", "hi", 100));
    feed.ingest(&like_payload(0, "B", 101));

    let json: serde_json::Value = serde_json::from_str(&feed.snapshot().to_json().unwrap()).unwrap();
    assert_eq!(json[0]["id"], 0);
    assert_eq!(json[0]["sender"], "A");
    assert_eq!(json[0]["likeCount"], 1);
    assert_eq!(json[0]["likedBy"][0], "B");
}
