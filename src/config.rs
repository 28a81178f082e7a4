use std::time::Duration;

/// Application configuration
/// In debug builds: loads from .env file first
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the room backend (rooms, playlist, chat, player state)
    pub room_api_base: String,
    /// Base URL of the legacy player-state backend, if deployed
    pub player_sync_base: Option<String>,
    pub player_poll: Duration,
    pub playlist_poll: Duration,
    pub chat_poll: Duration,
}

impl Config {
    /// Load configuration from the environment
    pub fn load() -> Self {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                println!("Config: Dev mode activated - loaded .env file");
            }
        }

        Self::from_env()
    }

    fn from_env() -> Self {
        let room_api_base = std::env::var("JAMROOM_API_BASE")
            .unwrap_or_else(|_| "http://localhost:8082".to_string());

        let player_sync_base = std::env::var("JAMROOM_PLAYERSTATE_BASE").ok();

        Self {
            room_api_base,
            player_sync_base,
            player_poll: env_millis("JAMROOM_PLAYER_POLL_MS", 1_000),
            playlist_poll: env_millis("JAMROOM_PLAYLIST_POLL_MS", 2_000),
            chat_poll: env_millis("JAMROOM_CHAT_POLL_MS", 1_000),
        }
    }
}

fn env_millis(key: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}
