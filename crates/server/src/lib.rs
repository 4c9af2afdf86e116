//! Wanderlink Social Server Library
//!
//! The friends and direct-messaging subsystem of the Wanderlink travel app:
//! a relationship graph and a message store over SQLite, with a realtime
//! layer that pushes deltas to per-user and per-conversation rooms. HTTP
//! endpoints serve the bootstrap/poll path; identity comes from session
//! tokens owned by the auth subsystem.

pub mod config;
pub mod db;
pub mod error;
pub mod friends;
pub mod handlers;
pub mod messages;
pub mod realtime;
pub mod sessions;
pub mod users;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::ServerConfig;
use db::Database;
use friends::FriendStore;
use messages::MessageStore;
use realtime::{realtime_ws, Dispatcher, RoomRegistry};
use sessions::SessionStore;
use users::UserDirectory;

/// Shared state for the HTTP handlers and the realtime channel.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub users: Arc<UserDirectory>,
    pub friends: Arc<FriendStore>,
    pub messages: Arc<MessageStore>,
    pub rooms: Arc<RoomRegistry>,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Wire stores and realtime plumbing over a connected database.
    pub fn new(config: &ServerConfig, db: &Database) -> Self {
        let sessions = Arc::new(SessionStore::new(db.pool.clone()));
        let users = Arc::new(UserDirectory::new(db.pool.clone()));
        let friends = Arc::new(FriendStore::new(db.pool.clone()));
        let messages = Arc::new(MessageStore::new(db.pool.clone()));
        let rooms = Arc::new(RoomRegistry::new(config.room_buffer));
        let dispatcher = Arc::new(Dispatcher::new(
            friends.clone(),
            messages.clone(),
            rooms.clone(),
        ));

        Self {
            sessions,
            users,
            friends,
            messages,
            rooms,
            dispatcher,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Bootstrap/poll endpoints
        .route("/api/friends", get(handlers::friends_overview))
        .route("/api/add_friend", post(handlers::add_friend))
        .route("/api/accept_friend", post(handlers::accept_friend))
        .route("/api/messages/{friend_id}", get(handlers::conversation_history))
        // Realtime channel
        .route("/ws", get(realtime_ws))
        // Health check
        .route("/health", get(health_check))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

pub async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        // Already set, ignore
    }

    let config = ServerConfig::from_env();

    info!("=== Wanderlink Social Server ===");
    info!("Database: {}", config.database_url);

    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let state = AppState::new(&config, &db);
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK - Wanderlink Social Server"
}
