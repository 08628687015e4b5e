//! Global and direct routing, history and message ownership.

mod helpers;

use serde_json::json;

use helpers::{TestEngine, error_code};
use liveboard_core::config::RealtimeConfig;
use liveboard_core::error::ErrorKind;
use liveboard_core::types::UserId;
use liveboard_database::MessageStore;
use liveboard_realtime::{ConversationKey, ServerEvent};

#[tokio::test]
async fn test_global_message_reaches_every_connection() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let mut a = app.join(&alice).await;
    let mut b = app.join(&bob).await;
    a.drain();

    a.send(json!({ "event": "send_message", "data": { "text": "  hello all  " } }))
        .await;

    for events in [a.drain(), b.drain()] {
        assert_eq!(events.len(), 1);
        let ServerEvent::ReceiveMessage(message) = &events[0] else {
            panic!("expected receive_message, got {:?}", events[0]);
        };
        assert_eq!(message.text, "hello all");
        assert_eq!(message.user.id, alice.user_id);
        assert!(!message.is_private);
    }
}

#[tokio::test]
async fn test_direct_message_to_online_peer() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let mut a = app.join(&alice).await;
    let mut b = app.join(&bob).await;
    a.drain();

    a.send(json!({
        "event": "send_private_message",
        "data": { "text": "hi bob", "toUserId": bob.user_id.to_string() }
    }))
    .await;

    let to_bob = b.drain();
    assert_eq!(to_bob.len(), 2, "{to_bob:?}");
    let ServerEvent::ReceivePrivateMessage(received) = &to_bob[0] else {
        panic!("expected receive_private_message, got {:?}", to_bob[0]);
    };
    assert_eq!(received.message.text, "hi bob");
    assert_eq!(received.from_user_id, alice.user_id);
    assert_eq!(received.to_user_id, bob.user_id);
    assert!(!received.message.is_read);
    assert_eq!(
        to_bob[1],
        ServerEvent::UnreadCountUpdate {
            from_user_id: alice.user_id,
            count: 1
        }
    );

    let to_alice = a.drain();
    assert_eq!(to_alice.len(), 2, "{to_alice:?}");
    assert_eq!(
        to_alice[0],
        ServerEvent::MessageDelivered {
            message_id: received.message.id,
            to_user_id: bob.user_id
        }
    );
    assert!(matches!(
        &to_alice[1],
        ServerEvent::ReceivePrivateMessage(echo) if echo.message.id == received.message.id
    ));
}

#[tokio::test]
async fn test_direct_message_to_offline_peer_is_stored() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let mut a = app.join(&alice).await;
    let b = app.join(&bob).await;
    b.close().await;
    a.drain();

    a.send(json!({
        "event": "send_private_message",
        "data": { "text": "see you later", "toUserId": bob.user_id.to_string() }
    }))
    .await;

    let events = a.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], ServerEvent::ReceivePrivateMessage(_)));

    let unread = MessageStore::count_unread(app.store.as_ref(), alice.user_id, bob.user_id)
        .await
        .expect("count");
    assert_eq!(unread, 1);
}

#[tokio::test]
async fn test_stale_stored_connection_gets_no_delivery_ack() {
    let before = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let _ghost = before.join(&alice).await;

    // Same store, new process; Alice's stored connection id is left over.
    let after = before.restarted();
    let bob = TestEngine::identity("Bob");
    let mut b = after.join(&bob).await;

    b.send(json!({
        "event": "send_private_message",
        "data": { "text": "are you there?", "toUserId": alice.user_id.to_string() }
    }))
    .await;

    let events = b.drain();
    assert_eq!(events.len(), 1, "{events:?}");
    assert!(matches!(&events[0], ServerEvent::ReceivePrivateMessage(_)));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, ServerEvent::MessageDelivered { .. }))
    );
}

#[tokio::test]
async fn test_direct_message_to_unknown_user_is_not_found() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");

    let mut a = app.join(&alice).await;
    a.send(json!({
        "event": "send_private_message",
        "data": { "text": "anyone?", "toUserId": UserId::new().to_string() }
    }))
    .await;

    let events = a.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(error_code(&events[0]), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_direct_send_without_origin_echoes_to_stored_connection() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let mut a = app.join(&alice).await;
    let _b = app.join(&bob).await;
    a.drain();

    app.engine
        .router
        .send_direct(alice.user_id, None, bob.user_id, "from rest")
        .await
        .expect("send");

    let events = a.drain();
    assert_eq!(events.len(), 2, "{events:?}");
    assert!(matches!(&events[0], ServerEvent::MessageDelivered { .. }));
    assert!(matches!(&events[1], ServerEvent::ReceivePrivateMessage(_)));
}

#[tokio::test]
async fn test_invalid_text_and_frames_are_rejected() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let mut a = app.join(&alice).await;

    a.send(json!({ "event": "send_message", "data": { "text": "   " } }))
        .await;
    a.send_raw("{not json").await;
    a.send(json!({ "event": "no_such_event" })).await;

    let events = a.drain();
    assert_eq!(events.len(), 3);
    assert!(events.iter().all(|e| error_code(e) == Some("VALIDATION")));
}

#[tokio::test]
async fn test_oversized_message_is_rejected() {
    let config = RealtimeConfig {
        max_message_length: 10,
        ..RealtimeConfig::default()
    };
    let app = TestEngine::with_config(config);
    let alice = TestEngine::identity("Alice");
    let mut a = app.join(&alice).await;

    a.send(json!({ "event": "send_message", "data": { "text": "x".repeat(11) } }))
        .await;

    let events = a.drain();
    assert_eq!(error_code(&events[0]), Some("VALIDATION"));
}

#[tokio::test]
async fn test_history_on_connect_is_oldest_first_and_limited() {
    let config = RealtimeConfig {
        history_limit: 2,
        ..RealtimeConfig::default()
    };
    let app = TestEngine::with_config(config);
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");

    let a = app.join(&alice).await;
    for text in ["one", "two", "three"] {
        a.send(json!({ "event": "send_message", "data": { "text": text } }))
            .await;
    }

    let mut late = app.open(&bob).await;
    let events = late.drain();
    let ServerEvent::History(history) = &events[0] else {
        panic!("expected history first, got {:?}", events[0]);
    };
    let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["two", "three"]);
}

#[tokio::test]
async fn test_direct_history_is_ordered_by_timestamp() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");
    let _a = app.join(&alice).await;
    let _b = app.join(&bob).await;

    let router = &app.engine.router;
    router
        .send_direct(alice.user_id, None, bob.user_id, "first")
        .await
        .expect("send");
    router
        .send_direct(bob.user_id, None, alice.user_id, "second")
        .await
        .expect("send");
    router
        .send_direct(alice.user_id, None, bob.user_id, "third")
        .await
        .expect("send");

    let history = router
        .history(ConversationKey::Direct(bob.user_id, alice.user_id))
        .await
        .expect("history");

    let texts: Vec<&str> = history.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert!(history.windows(2).all(|w| w[0].created_at <= w[1].created_at));
}

#[tokio::test]
async fn test_only_the_sender_can_edit_or_delete() {
    let app = TestEngine::new();
    let alice = TestEngine::identity("Alice");
    let bob = TestEngine::identity("Bob");
    let _a = app.join(&alice).await;
    let _b = app.join(&bob).await;

    let router = &app.engine.router;
    let sent = router
        .send_global(alice.user_id, "original")
        .await
        .expect("send");

    let err = router
        .edit_message(bob.user_id, sent.id, "hijacked")
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let err = router.delete_message(bob.user_id, sent.id).await.unwrap_err();
    assert!(err.is(ErrorKind::NotFound));

    let edited = router
        .edit_message(alice.user_id, sent.id, "edited")
        .await
        .expect("edit");
    assert_eq!(edited.text, "edited");

    router
        .delete_message(alice.user_id, sent.id)
        .await
        .expect("delete");

    let err = router
        .delete_message(alice.user_id, sent.id)
        .await
        .unwrap_err();
    assert!(err.is(ErrorKind::NotFound));
}
