//! Per-room session service.
//!
//! One spawned task owns the whole view state for a room: the reconciler,
//! the local media element, the playlist and the poll timers. Commands
//! arrive over a channel, updates leave over the [`SessionEvents`] fanout,
//! and dropping the handle tears everything down.

pub mod events;

pub use events::{SessionEvent, SessionEvents};

use crate::models::{
    AddTrackRequest, ChatMessageRequest, VoteTrackRequest, DEFAULT_TRACK_DURATION_MS,
};
use crate::playback::{MediaElement, Reconciler, ReconcilerConfig};
use crate::room_client::RoomApiClient;
use std::time::{Duration, Instant};
use tokio::sync::mpsc as tokio_mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Commands sent to the session task
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Play,
    Pause,
    Next,
    AddTrack {
        title: String,
        url: String,
        duration_ms: Option<u64>,
    },
    Vote {
        track_id: i64,
        delta: i32,
    },
    SendChat(String),
    // Events forwarded from whatever drives the media element
    MediaMetadataLoaded,
    MediaCanPlay,
    MediaTimeUpdate,
}

/// Poll cadence and reconciler tunables for one session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub player_poll: Duration,
    pub playlist_poll: Duration,
    pub chat_poll: Duration,
    pub reconciler: ReconcilerConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            player_poll: Duration::from_millis(1_000),
            playlist_poll: Duration::from_millis(2_000),
            chat_poll: Duration::from_millis(1_000),
            reconciler: ReconcilerConfig::default(),
        }
    }
}

/// Handle to a running room session for sending commands
#[derive(Clone)]
pub struct RoomSessionHandle {
    command_tx: tokio_mpsc::UnboundedSender<SessionCommand>,
    events: SessionEvents,
}

impl RoomSessionHandle {
    pub fn play(&self) {
        let _ = self.command_tx.send(SessionCommand::Play);
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(SessionCommand::Pause);
    }

    pub fn next(&self) {
        let _ = self.command_tx.send(SessionCommand::Next);
    }

    pub fn add_track(&self, title: impl Into<String>, url: impl Into<String>, duration_ms: Option<u64>) {
        let _ = self.command_tx.send(SessionCommand::AddTrack {
            title: title.into(),
            url: url.into(),
            duration_ms,
        });
    }

    pub fn vote(&self, track_id: i64, delta: i32) {
        let _ = self.command_tx.send(SessionCommand::Vote { track_id, delta });
    }

    pub fn send_chat(&self, message: impl Into<String>) {
        let _ = self.command_tx.send(SessionCommand::SendChat(message.into()));
    }

    pub fn notify_metadata_loaded(&self) {
        let _ = self.command_tx.send(SessionCommand::MediaMetadataLoaded);
    }

    pub fn notify_can_play(&self) {
        let _ = self.command_tx.send(SessionCommand::MediaCanPlay);
    }

    pub fn notify_time_update(&self) {
        let _ = self.command_tx.send(SessionCommand::MediaTimeUpdate);
    }

    pub fn subscribe(&self) -> tokio_mpsc::UnboundedReceiver<SessionEvent> {
        self.events.subscribe()
    }
}

/// The session service; owns all mutable view state for one room.
pub struct RoomSession<E: MediaElement> {
    client: RoomApiClient,
    room_id: String,
    user_id: String,
    config: SessionConfig,
    reconciler: Reconciler,
    element: E,
    playlist_len: usize,
    command_rx: tokio_mpsc::UnboundedReceiver<SessionCommand>,
    events: SessionEvents,
}

impl<E: MediaElement + Send + 'static> RoomSession<E> {
    /// Spawn the session task and return its handle. The task exits when
    /// every clone of the handle has been dropped.
    pub fn start(
        client: RoomApiClient,
        room_id: impl Into<String>,
        user_id: impl Into<String>,
        element: E,
        config: SessionConfig,
    ) -> RoomSessionHandle {
        let (command_tx, command_rx) = tokio_mpsc::unbounded_channel();
        let events = SessionEvents::new();

        let handle = RoomSessionHandle {
            command_tx,
            events: events.clone(),
        };

        let reconciler = Reconciler::new(config.reconciler.clone());
        let mut session = RoomSession {
            client,
            room_id: room_id.into(),
            user_id: user_id.into(),
            config,
            reconciler,
            element,
            playlist_len: 0,
            command_rx,
            events,
        };

        tokio::spawn(async move {
            session.run().await;
        });

        handle
    }

    async fn run(&mut self) {
        info!("room session started for {}", self.room_id);

        let mut player_tick = tokio::time::interval(self.config.player_poll);
        let mut playlist_tick = tokio::time::interval(self.config.playlist_poll);
        let mut chat_tick = tokio::time::interval(self.config.chat_poll);
        // Polls are awaited inline, so a slow backend must not queue up a
        // burst of immediate ticks behind it.
        player_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        playlist_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        chat_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                _ = player_tick.tick() => self.poll_player_state().await,
                _ = playlist_tick.tick() => self.poll_playlist().await,
                _ = chat_tick.tick() => self.poll_chat().await,
            }
        }

        info!("room session stopped for {}", self.room_id);
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Play => {
                // Act locally first so the UI responds instantly, and open
                // the grace window so the next poll can't undo it.
                self.reconciler.note_user_action(Instant::now());
                if self.element.is_paused() {
                    if let Err(err) = self.element.play() {
                        debug!("local play refused: {}", err);
                    }
                }
                if let Err(err) = self.client.play(&self.room_id).await {
                    self.publish_error("Could not start playback", err);
                }
            }
            SessionCommand::Pause => {
                self.reconciler.note_user_action(Instant::now());
                if !self.element.is_paused() {
                    self.element.pause();
                }
                if let Err(err) = self.client.pause(&self.room_id).await {
                    self.publish_error("Could not pause playback", err);
                }
            }
            SessionCommand::Next => {
                if !self.can_go_next() {
                    return;
                }
                self.reconciler.reset_display();
                match self.client.next(&self.room_id).await {
                    Ok(_) => {
                        // Pull fresh state right away instead of waiting
                        // out the poll intervals.
                        self.poll_playlist().await;
                        self.poll_player_state().await;
                    }
                    Err(err) => self.publish_error("Could not skip to the next track", err),
                }
            }
            SessionCommand::AddTrack {
                title,
                url,
                duration_ms,
            } => {
                if title.is_empty() || url.is_empty() {
                    self.events.publish(SessionEvent::Error {
                        message: "Title and URL are required".to_string(),
                    });
                    return;
                }
                let request = AddTrackRequest {
                    user_id: self.user_id.clone(),
                    track_url: url,
                    track_title: title,
                    duration_ms: duration_ms.unwrap_or(DEFAULT_TRACK_DURATION_MS),
                };
                match self.client.add_track(&self.room_id, &request).await {
                    Ok(_) => self.poll_playlist().await,
                    Err(err) => self.publish_error("Could not add the track", err),
                }
            }
            SessionCommand::Vote { track_id, delta } => {
                let request = VoteTrackRequest {
                    user_id: self.user_id.clone(),
                    delta,
                };
                match self.client.vote_track(&self.room_id, track_id, &request).await {
                    Ok(_) => self.poll_playlist().await,
                    Err(err) => self.publish_error("Could not register the vote", err),
                }
            }
            SessionCommand::SendChat(message) => {
                let text = message.trim().to_string();
                if text.is_empty() {
                    return;
                }
                let request = ChatMessageRequest {
                    user_id: self.user_id.clone(),
                    message: text,
                };
                match self.client.send_chat(&self.room_id, &request).await {
                    Ok(_) => self.poll_chat().await,
                    Err(err) => self.publish_error("Could not send the message", err),
                }
            }
            SessionCommand::MediaMetadataLoaded => {
                self.reconciler.on_metadata_loaded(&mut self.element);
                self.publish_position();
            }
            SessionCommand::MediaCanPlay => {
                self.reconciler.on_can_play(&mut self.element);
            }
            SessionCommand::MediaTimeUpdate => {
                self.reconciler.on_time_update(&self.element);
                self.publish_position();
            }
        }
    }

    /// Next is only meaningful with a queued playlist and a current track.
    fn can_go_next(&self) -> bool {
        self.playlist_len > 0 && self.reconciler.current_url().is_some()
    }

    async fn poll_player_state(&mut self) {
        match self.client.get_player_state(&self.room_id).await {
            Ok(snapshot) => {
                self.reconciler
                    .apply_snapshot(&mut self.element, &snapshot, Instant::now());
                self.events
                    .publish(SessionEvent::PlayerStateChanged { snapshot });
                self.publish_position();
            }
            Err(err) => debug!("player state poll failed: {}", err),
        }
    }

    async fn poll_playlist(&mut self) {
        match self.client.get_playlist(&self.room_id).await {
            Ok(state) => {
                self.playlist_len = state.tracks.len();
                self.events.publish(SessionEvent::PlaylistUpdated {
                    tracks: state.tracks,
                });
            }
            Err(err) => debug!("playlist poll failed: {}", err),
        }
    }

    async fn poll_chat(&mut self) {
        match self.client.get_chat_history(&self.room_id).await {
            Ok(lines) => self.events.publish(SessionEvent::ChatUpdated { lines }),
            Err(err) => debug!("chat poll failed: {}", err),
        }
    }

    fn publish_position(&self) {
        self.events.publish(SessionEvent::PositionChanged {
            position_ms: self.reconciler.display_position_ms(Instant::now()),
            duration_ms: self.reconciler.display_duration_ms(),
        });
    }

    fn publish_error(&self, message: &str, err: impl std::fmt::Display) {
        debug!("{}: {}", message, err);
        self.events.publish(SessionEvent::Error {
            message: message.to_string(),
        });
    }
}
