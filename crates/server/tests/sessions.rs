//! Session token resolution: the identity seam the rest of the service
//! leans on.

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
async fn issued_token_resolves_until_revoked() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();

    let session = state.sessions.issue(asha, None).await.unwrap();
    assert_eq!(
        state.sessions.validate(&session.token).await.unwrap(),
        Some(asha)
    );

    state.sessions.revoke(&session.token).await.unwrap();
    assert_eq!(state.sessions.validate(&session.token).await.unwrap(), None);
}

#[tokio::test]
async fn unknown_token_does_not_resolve() {
    let (state, _dir) = setup().await;

    assert_eq!(
        state.sessions.validate("not-a-real-token").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn expired_token_does_not_resolve() {
    let (state, _dir) = setup().await;
    let asha = state.users.create("Asha", "asha@example.com").await.unwrap();

    let session = state
        .sessions
        .issue(asha, Some(chrono::Duration::seconds(-1)))
        .await
        .unwrap();
    assert_eq!(state.sessions.validate(&session.token).await.unwrap(), None);
}
