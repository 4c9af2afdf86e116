//! Dispatcher and room delivery: events land in the right rooms, exactly
//! once per subscriber, and no-ops emit nothing.

use server::config::ServerConfig;
use server::db::Database;
use server::realtime::{dm_room, user_room, ClientEvent, ServerEvent, Subscription};
use server::AppState;
use tempfile::TempDir;
use tokio::sync::broadcast::error::TryRecvError;

async fn setup() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::with_base_dir(dir.path());
    let db = Database::connect(&config.database_url).await.unwrap();
    db.migrate().await.unwrap();
    (AppState::new(&config, &db), dir)
}

#[tokio::test]
async fn message_reaches_both_joined_connections_once() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();
    let bruno = state.users.create("Bruno", "bruno@example.com").await.unwrap();

    // Both sides joined to the conversation room, order-independent.
    let mut asha_rx = state.rooms.subscribe(&dm_room(asha, bruno)).await;
    let mut bruno_rx = state.rooms.subscribe(&dm_room(bruno, asha)).await;

    state
        .dispatcher
        .handle(
            asha,
            ClientEvent::SendMessage {
                receiver_id: bruno,
                message: "hello".to_string(),
            },
        )
        .await;

    let expected = ServerEvent::NewMessage {
        sender_id: asha,
        message: "hello".to_string(),
    };
    assert_eq!(asha_rx.recv().await.unwrap(), expected);
    assert_eq!(bruno_rx.recv().await.unwrap(), expected);

    // Exactly once per subscriber.
    assert!(matches!(asha_rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(matches!(bruno_rx.try_recv(), Err(TryRecvError::Empty)));

    // And the message was persisted.
    let stored = state.messages.conversation(asha, bruno).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].body, "hello");
}

#[tokio::test]
async fn friend_request_notifies_recipient_room() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();
    let bruno = state.users.create("Bruno", "bruno@example.com").await.unwrap();

    let mut bruno_rx = state.rooms.subscribe(&user_room(bruno)).await;

    state
        .dispatcher
        .handle(asha, ClientEvent::SendFriendRequest { friend_id: bruno })
        .await;

    assert_eq!(
        bruno_rx.recv().await.unwrap(),
        ServerEvent::ReceiveFriendRequest { from_id: asha }
    );

    // A duplicate request is a store no-op and emits nothing.
    state
        .dispatcher
        .handle(asha, ClientEvent::SendFriendRequest { friend_id: bruno })
        .await;
    assert!(matches!(bruno_rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn accept_notifies_both_parties() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();
    let bruno = state.users.create("Bruno", "bruno@example.com").await.unwrap();

    state
        .dispatcher
        .handle(asha, ClientEvent::SendFriendRequest { friend_id: bruno })
        .await;

    let mut asha_rx = state.rooms.subscribe(&user_room(asha)).await;
    let mut bruno_rx = state.rooms.subscribe(&user_room(bruno)).await;

    state
        .dispatcher
        .handle(bruno, ClientEvent::AcceptFriendRequest { friend_id: asha })
        .await;

    // Each side receives the id of its new friend.
    assert_eq!(
        bruno_rx.recv().await.unwrap(),
        ServerEvent::FriendRequestAccepted { friend_id: asha }
    );
    assert_eq!(
        asha_rx.recv().await.unwrap(),
        ServerEvent::FriendRequestAccepted { friend_id: bruno }
    );
}

#[tokio::test]
async fn accept_without_pending_request_emits_nothing() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();
    let bruno = state.users.create("Bruno", "bruno@example.com").await.unwrap();

    let mut asha_rx = state.rooms.subscribe(&user_room(asha)).await;
    let mut bruno_rx = state.rooms.subscribe(&user_room(bruno)).await;

    state
        .dispatcher
        .handle(bruno, ClientEvent::AcceptFriendRequest { friend_id: asha })
        .await;

    assert!(matches!(asha_rx.try_recv(), Err(TryRecvError::Empty)));
    assert!(matches!(bruno_rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn join_events_map_to_room_subscriptions() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();
    let bruno = state.users.create("Bruno", "bruno@example.com").await.unwrap();

    assert_eq!(
        state.dispatcher.handle(asha, ClientEvent::JoinUserRoom).await,
        Subscription::Join(user_room(asha))
    );
    // The conversation room is canonicalized regardless of who joins.
    assert_eq!(
        state
            .dispatcher
            .handle(bruno, ClientEvent::JoinDm { friend_id: asha })
            .await,
        Subscription::Join(dm_room(asha, bruno))
    );
}

#[tokio::test]
async fn publish_to_empty_room_is_dropped() {
    let (state, _dir) = setup().await;

    let delivered = state
        .rooms
        .publish(
            &user_room(99),
            ServerEvent::ReceiveFriendRequest { from_id: 1 },
        )
        .await;
    assert_eq!(delivered, 0);
    assert_eq!(state.rooms.room_count().await, 0);

    // A room whose last subscriber left is pruned on the next publish.
    let rx = state.rooms.subscribe(&user_room(99)).await;
    assert_eq!(state.rooms.room_count().await, 1);
    drop(rx);
    let delivered = state
        .rooms
        .publish(
            &user_room(99),
            ServerEvent::ReceiveFriendRequest { from_id: 1 },
        )
        .await;
    assert_eq!(delivered, 0);
    assert_eq!(state.rooms.room_count().await, 0);
}
