//! Client for the older player-state backend.
//!
//! This service evolved separately from the room backend: rooms are integer
//! ids, the base path is `/playerstate`, and status, current track and
//! position are exposed as three separate endpoints. `full_state` fetches
//! all three concurrently and combines them into one reading.

use crate::models::PlayerStatus;
use reqwest::{Client, Error as ReqwestError};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PlayerSyncError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),
    #[error("Player state not found for room")]
    NotFound,
    #[error("Backend rejected request: status {0}")]
    Status(u16),
}

/// Combined player reading for one room, assembled client-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPlayerState {
    pub room_id: i64,
    pub status: PlayerStatus,
    pub current_track_id: i64,
    pub position_ms: u64,
}

#[derive(Clone)]
pub struct PlayerSyncClient {
    client: Client,
    base_url: String,
}

impl PlayerSyncClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Register a player state for the room on the backend.
    pub async fn add_player_state(&self, room_id: i64) -> Result<String, PlayerSyncError> {
        self.post(&format!("/playerstate/add-player-state/{}", room_id))
            .await
    }

    pub async fn remove_player_state(&self, room_id: i64) -> Result<String, PlayerSyncError> {
        self.post(&format!("/playerstate/remove-player-state/{}", room_id))
            .await
    }

    pub async fn toggle(&self, room_id: i64) -> Result<(), PlayerSyncError> {
        self.post(&format!("/playerstate/{}/toggle", room_id))
            .await
            .map(|_| ())
    }

    pub async fn next(&self, room_id: i64) -> Result<(), PlayerSyncError> {
        self.post(&format!("/playerstate/{}/next", room_id))
            .await
            .map(|_| ())
    }

    /// Jump back to the beginning of the current track.
    pub async fn prev(&self, room_id: i64) -> Result<(), PlayerSyncError> {
        self.post(&format!("/playerstate/{}/prev", room_id))
            .await
            .map(|_| ())
    }

    pub async fn get_status(&self, room_id: i64) -> Result<PlayerStatus, PlayerSyncError> {
        self.get_json(&format!("/playerstate/{}/status", room_id))
            .await
    }

    pub async fn get_current_track(&self, room_id: i64) -> Result<i64, PlayerSyncError> {
        self.get_json(&format!("/playerstate/{}/current-track", room_id))
            .await
    }

    pub async fn get_current_position(&self, room_id: i64) -> Result<u64, PlayerSyncError> {
        self.get_json(&format!("/playerstate/{}/current-position", room_id))
            .await
    }

    /// Fetch status, current track and position concurrently and combine
    /// them into one [`RoomPlayerState`].
    pub async fn full_state(&self, room_id: i64) -> Result<RoomPlayerState, PlayerSyncError> {
        let (status, current_track_id, position_ms) = futures::try_join!(
            self.get_status(room_id),
            self.get_current_track(room_id),
            self.get_current_position(room_id),
        )?;

        Ok(RoomPlayerState {
            room_id,
            status,
            current_track_id,
            position_ms,
        })
    }

    async fn post(&self, path: &str) -> Result<String, PlayerSyncError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self.client.post(&url).send().await?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            Err(status_error(response.status()))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PlayerSyncError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(status_error(response.status()))
        }
    }
}

fn status_error(status: reqwest::StatusCode) -> PlayerSyncError {
    if status == reqwest::StatusCode::NOT_FOUND {
        PlayerSyncError::NotFound
    } else {
        PlayerSyncError::Status(status.as_u16())
    }
}
