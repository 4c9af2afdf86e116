//! Message store: ordering, symmetry, and per-pair isolation.

use server::config::ServerConfig;
use server::db::Database;
use server::AppState;
use tempfile::TempDir;

async fn setup() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig::with_base_dir(dir.path());
    let db = Database::connect(&config.database_url).await.unwrap();
    db.migrate().await.unwrap();
    (AppState::new(&config, &db), dir)
}

#[tokio::test]
async fn conversation_is_symmetric_and_ordered() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();
    let bruno = state.users.create("Bruno", "bruno@example.com").await.unwrap();

    state.messages.append(asha, bruno, "ciao").await.unwrap();
    state.messages.append(bruno, asha, "hey!").await.unwrap();
    state
        .messages
        .append(asha, bruno, "how was the flight?")
        .await
        .unwrap();

    let ab = state.messages.conversation(asha, bruno).await.unwrap();
    let ba = state.messages.conversation(bruno, asha).await.unwrap();
    assert_eq!(ab, ba);

    let bodies: Vec<&str> = ab.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, ["ciao", "hey!", "how was the flight?"]);

    // Timestamps never decrease; ids break ties in insertion order.
    for pair in ab.windows(2) {
        assert!(pair[0].sent_at <= pair[1].sent_at);
        assert!(pair[0].id < pair[1].id);
    }
}

#[tokio::test]
async fn conversations_are_isolated_per_pair() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();
    let bruno = state.users.create("Bruno", "bruno@example.com").await.unwrap();
    let cleo = state.users.create("Cleo", "cleo@example.com").await.unwrap();

    state.messages.append(asha, bruno, "ciao").await.unwrap();
    state
        .messages
        .append(asha, cleo, "packing tips?")
        .await
        .unwrap();

    let with_bruno = state.messages.conversation(asha, bruno).await.unwrap();
    assert_eq!(with_bruno.len(), 1);
    assert_eq!(with_bruno[0].body, "ciao");

    let with_cleo = state.messages.conversation(cleo, asha).await.unwrap();
    assert_eq!(with_cleo.len(), 1);
    assert_eq!(with_cleo[0].body, "packing tips?");
}

#[tokio::test]
async fn append_round_trips_through_storage() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();
    let bruno = state.users.create("Bruno", "bruno@example.com").await.unwrap();

    let stored = state.messages.append(asha, bruno, "ciao").await.unwrap();
    assert!(stored.id > 0);
    assert_eq!(stored.sender_id, asha);
    assert_eq!(stored.receiver_id, bruno);

    let fetched = state.messages.conversation(asha, bruno).await.unwrap();
    assert_eq!(fetched, vec![stored]);
}
