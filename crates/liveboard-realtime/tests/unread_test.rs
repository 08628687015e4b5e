//! Unread counts, read receipts and typing signals.

mod helpers;

use serde_json::json;

use helpers::TestEngine;
use liveboard_database::MessageStore;
use liveboard_entity::UnreadCount;
use liveboard_realtime::ServerEvent;

fn unread_updates(events: &[ServerEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            ServerEvent::UnreadCountUpdate { count, .. } => Some(*count),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_unread_count_grows_with_each_message() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let a = app.join(&alice).await;
    let mut b = app.join(&bob).await;

    for text in ["one", "two", "three"] {
        a.send(json!({
            "event": "send_private_message",
            "data": { "text": text, "toUserId": bob.user_id.to_string() }
        }))
        .await;
    }

    assert_eq!(unread_updates(&b.drain()), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_unread_counts_only_sends_since_last_mark_read() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let a = app.join(&alice).await;
    let mut b = app.join(&bob).await;
    let to_bob = |text: &str| {
        json!({
            "event": "send_private_message",
            "data": { "text": text, "toUserId": bob.user_id.to_string() }
        })
    };

    a.send(to_bob("one")).await;
    a.send(to_bob("two")).await;
    b.send(json!({
        "event": "mark_messages_read",
        "data": { "otherUserId": alice.user_id.to_string() }
    }))
    .await;
    a.send(to_bob("three")).await;
    // Replies go the other way and never count against Bob.
    b.send(json!({
        "event": "send_private_message",
        "data": { "text": "got it", "toUserId": alice.user_id.to_string() }
    }))
    .await;

    assert_eq!(unread_updates(&b.drain()), vec![1, 2, 0, 1]);
    let unread = MessageStore::count_unread(app.store.as_ref(), alice.user_id, bob.user_id)
        .await
        .expect("count");
    assert_eq!(unread, 1);
}

#[tokio::test]
async fn test_mark_read_notifies_both_sides() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let mut a = app.join(&alice).await;
    let mut b = app.join(&bob).await;
    for text in ["one", "two"] {
        a.send(json!({
            "event": "send_private_message",
            "data": { "text": text, "toUserId": bob.user_id.to_string() }
        }))
        .await;
    }
    a.drain();
    b.drain();

    b.send(json!({
        "event": "mark_messages_read",
        "data": { "otherUserId": alice.user_id.to_string() }
    }))
    .await;

    assert_eq!(
        a.drain(),
        vec![ServerEvent::MessagesReadUpdate {
            read_by_user_id: bob.user_id
        }]
    );
    assert_eq!(
        b.drain(),
        vec![ServerEvent::UnreadCountUpdate {
            from_user_id: alice.user_id,
            count: 0
        }]
    );

    let unread = MessageStore::count_unread(app.store.as_ref(), alice.user_id, bob.user_id)
        .await
        .expect("count");
    assert_eq!(unread, 0);
}

#[tokio::test]
async fn test_mark_read_is_idempotent() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");
    let _a = app.join(&alice).await;
    let b = app.join(&bob).await;

    for text in ["one", "two", "three"] {
        app.engine
            .router
            .send_direct(alice.user_id, None, bob.user_id, text)
            .await
            .expect("send");
    }

    let ledger = &app.engine.ledger;
    let first = ledger
        .mark_read(bob.user_id, alice.user_id, b.conn_id)
        .await
        .expect("mark");
    let second = ledger
        .mark_read(bob.user_id, alice.user_id, b.conn_id)
        .await
        .expect("mark");

    assert_eq!(first, 3);
    assert_eq!(second, 0);
    assert_eq!(
        ledger
            .count_unread(alice.user_id, bob.user_id)
            .await
            .expect("count"),
        0
    );
}

#[tokio::test]
async fn test_get_unread_counts_groups_by_sender() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");
    let carol = TestEngine::identity("Carol");
    let _a = app.join(&alice).await;
    let mut b = app.join(&bob).await;
    let _c = app.join(&carol).await;

    let router = &app.engine.router;
    router
        .send_direct(alice.user_id, None, bob.user_id, "a1")
        .await
        .expect("send");
    router
        .send_direct(alice.user_id, None, bob.user_id, "a2")
        .await
        .expect("send");
    router
        .send_direct(carol.user_id, None, bob.user_id, "c1")
        .await
        .expect("send");
    b.drain();

    b.send(json!({ "event": "get_unread_counts" })).await;

    let events = b.drain();
    assert_eq!(events.len(), 1);
    let ServerEvent::UnreadCounts(mut counts) = events[0].clone() else {
        panic!("expected unread_counts, got {:?}", events[0]);
    };
    counts.sort_by_key(|c| c.count);
    assert_eq!(
        counts,
        vec![
            UnreadCount {
                user_id: carol.user_id,
                count: 1
            },
            UnreadCount {
                user_id: alice.user_id,
                count: 2
            },
        ]
    );
}

#[tokio::test]
async fn test_typing_reaches_others_only() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");
    let mut a = app.join(&alice).await;
    let mut b = app.join(&bob).await;
    a.drain();

    a.send(json!({ "event": "typing", "data": true })).await;

    assert!(a.drain().is_empty());
    assert_eq!(
        b.drain(),
        vec![ServerEvent::TypingIndicator {
            connection_id: a.conn_id,
            is_typing: true
        }]
    );
}

#[tokio::test]
async fn test_private_typing_to_offline_user_is_dropped() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");
    let mut a = app.join(&alice).await;
    let mut b = app.join(&bob).await;
    a.drain();

    a.send(json!({
        "event": "typing_private",
        "data": { "toUserId": bob.user_id.to_string(), "isTyping": true }
    }))
    .await;
    assert_eq!(
        b.drain(),
        vec![ServerEvent::TypingIndicatorPrivate {
            from_user_id: alice.user_id,
            is_typing: true
        }]
    );

    b.close().await;
    let sent = app
        .engine
        .relay
        .typing_direct(alice.user_id, bob.user_id, false)
        .await
        .expect("relay");
    assert!(!sent);
    assert!(a.drain().iter().all(|e| !matches!(e, ServerEvent::TypingIndicatorPrivate { .. })));
}

#[tokio::test]
async fn test_mark_read_succeeds_when_receipt_lookup_fails() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let mut a = app.join(&alice).await;
    let mut b = app.join(&bob).await;
    a.send(json!({
        "event": "send_private_message",
        "data": { "text": "hi", "toUserId": bob.user_id.to_string() }
    }))
    .await;
    a.drain();
    b.drain();

    app.store.set_users_available(false);
    b.send(json!({
        "event": "mark_messages_read",
        "data": { "otherUserId": alice.user_id.to_string() }
    }))
    .await;
    app.store.set_users_available(true);

    assert_eq!(
        b.drain(),
        vec![ServerEvent::UnreadCountUpdate {
            from_user_id: alice.user_id,
            count: 0,
        }]
    );
    assert!(a.drain().is_empty());
    let unread = MessageStore::count_unread(app.store.as_ref(), alice.user_id, bob.user_id)
        .await
        .expect("count");
    assert_eq!(unread, 0);
}
