use jamroom::config::Config;
use jamroom::models::{CreateRoomRequest, JoinRoomRequest};
use jamroom::playback::{format_time, progress_percent, MediaElement, PlaybackBlocked};
use jamroom::player_sync::PlayerSyncClient;
use jamroom::room_client::RoomApiClient;
use jamroom::session::{RoomSession, SessionConfig, SessionEvent};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Media element for the terminal demo: tracks the state the reconciler
/// pushes at it but produces no audio.
#[derive(Default)]
struct HeadlessElement {
    position_ms: u64,
    duration_ms: Option<u64>,
    paused: bool,
    source: Option<String>,
}

impl MediaElement for HeadlessElement {
    fn position_ms(&self) -> u64 {
        self.position_ms
    }

    fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_source(&mut self, url: &str) {
        info!("element source -> {}", url);
        self.source = Some(url.to_string());
        self.position_ms = 0;
        self.duration_ms = None;
    }

    fn load(&mut self) {}

    fn seek_ms(&mut self, position_ms: u64) {
        self.position_ms = position_ms;
    }

    fn play(&mut self) -> Result<(), PlaybackBlocked> {
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load();
    let client = RoomApiClient::new(config.room_api_base.clone());

    let user_id = std::env::var("JAMROOM_USER_ID").unwrap_or_else(|_| "anonymous".to_string());

    // Join an existing room when one is given, otherwise create a new one.
    let room_id = match std::env::var("JAMROOM_ROOM_ID") {
        Ok(room_id) => {
            let req = JoinRoomRequest {
                user_id: user_id.clone(),
            };
            client.join_room(&room_id, &req).await?;
            info!("joined room {}", room_id);
            room_id
        }
        Err(_) => {
            let req = CreateRoomRequest {
                user_id: user_id.clone(),
                room_name: std::env::var("JAMROOM_ROOM_NAME").ok(),
            };
            let created = client.create_room(&req).await?;
            info!("created room {} ({})", created.room_id, created.room_name);
            created.room_id
        }
    };

    // The legacy player-state service, when deployed, keys rooms by an
    // integer id of its own; report its view once at startup.
    if let Some(base) = &config.player_sync_base {
        if let Ok(legacy_room) = std::env::var("JAMROOM_LEGACY_ROOM_ID") {
            if let Ok(legacy_room) = legacy_room.parse::<i64>() {
                let legacy = PlayerSyncClient::new(base.clone());
                match legacy.full_state(legacy_room).await {
                    Ok(state) => info!(
                        "legacy player: track {} at {} [{}]",
                        state.current_track_id,
                        format_time(state.position_ms),
                        state.status.as_str(),
                    ),
                    Err(err) => warn!("legacy player state unavailable: {}", err),
                }
            }
        }
    }

    let session_config = SessionConfig {
        player_poll: config.player_poll,
        playlist_poll: config.playlist_poll,
        chat_poll: config.chat_poll,
        ..SessionConfig::default()
    };

    let handle = RoomSession::start(
        client,
        room_id.clone(),
        user_id,
        HeadlessElement::default(),
        session_config,
    );
    let mut events = handle.subscribe();

    info!("listening to room {} - ctrl-c to quit", room_id);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(SessionEvent::PlayerStateChanged { snapshot }) => {
                    info!(
                        "now: {} [{}]",
                        snapshot.current_title.as_deref().unwrap_or("none"),
                        snapshot.status.as_str(),
                    );
                }
                Some(SessionEvent::PositionChanged { position_ms, duration_ms }) => {
                    info!(
                        "{} / {} ({}%)",
                        format_time(position_ms),
                        format_time(duration_ms),
                        progress_percent(position_ms, duration_ms),
                    );
                }
                Some(SessionEvent::PlaylistUpdated { tracks }) => {
                    info!("playlist: {} track(s)", tracks.len());
                }
                Some(SessionEvent::ChatUpdated { lines }) => {
                    if let Some(last) = lines.last() {
                        info!("chat <{}> {}", last.user_id, last.message);
                    }
                }
                Some(SessionEvent::Error { message }) => warn!("{}", message),
                None => break,
            },
        }
    }

    Ok(())
}
