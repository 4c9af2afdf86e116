//! Server configuration

use std::env;
use std::path::PathBuf;

/// Configuration for the social server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// SQLite database url
    pub database_url: String,
    /// Capacity of each room's broadcast channel
    pub room_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            database_url: "sqlite:data/wanderlink.sqlite".to_string(),
            room_buffer: 64,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("SERVER_HOST").unwrap_or(defaults.host),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            room_buffer: env::var("ROOM_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.room_buffer),
        }
    }

    /// Create config with the database file under a custom base directory.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        let base = base_dir.into();
        Self {
            database_url: format!("sqlite:{}", base.join("wanderlink.sqlite").display()),
            ..Self::default()
        }
    }
}
