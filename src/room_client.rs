use crate::models::{
    AddTrackRequest, ChatLine, ChatMessageRequest, CreateRoomRequest, CreateRoomResponse,
    JoinRoomRequest, PlayerStateSnapshot, PlaylistState, VoteTrackRequest,
};
use reqwest::{Client, Error as ReqwestError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RoomApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] ReqwestError),
    #[error("Room not found")]
    NotFound,
    #[error("Backend rejected request: status {0}")]
    Status(u16),
}

/// Client for the room backend: rooms, playlist, transport, chat.
///
/// Mutating endpoints answer with a plain-text acknowledgement, query
/// endpoints with JSON. Every method maps non-success statuses into
/// [`RoomApiError`] at the call site; nothing is retried here.
#[derive(Clone)]
pub struct RoomApiClient {
    client: Client,
    base_url: String,
}

impl RoomApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create a room. The only room endpoint that answers with JSON.
    pub async fn create_room(
        &self,
        req: &CreateRoomRequest,
    ) -> Result<CreateRoomResponse, RoomApiError> {
        let url = format!("{}/api/rooms", self.base_url);
        let response = self.client.post(&url).json(req).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(status_error(response.status()))
        }
    }

    pub async fn join_room(
        &self,
        room_id: &str,
        req: &JoinRoomRequest,
    ) -> Result<String, RoomApiError> {
        self.post_text(&format!("/api/rooms/{}/join", room_id), req)
            .await
    }

    pub async fn leave_room(&self, room_id: &str, user_id: &str) -> Result<String, RoomApiError> {
        self.post_text(
            &format!("/api/rooms/{}/leave", room_id),
            &json!({ "userId": user_id }),
        )
        .await
    }

    pub async fn add_track(
        &self,
        room_id: &str,
        req: &AddTrackRequest,
    ) -> Result<String, RoomApiError> {
        self.post_text(&format!("/api/rooms/{}/tracks", room_id), req)
            .await
    }

    pub async fn vote_track(
        &self,
        room_id: &str,
        track_id: i64,
        req: &VoteTrackRequest,
    ) -> Result<String, RoomApiError> {
        self.post_text(&format!("/api/rooms/{}/tracks/{}/vote", room_id, track_id), req)
            .await
    }

    pub async fn play(&self, room_id: &str) -> Result<String, RoomApiError> {
        self.post_text(&format!("/api/rooms/{}/play", room_id), &json!({}))
            .await
    }

    pub async fn pause(&self, room_id: &str) -> Result<String, RoomApiError> {
        self.post_text(&format!("/api/rooms/{}/pause", room_id), &json!({}))
            .await
    }

    pub async fn next(&self, room_id: &str) -> Result<String, RoomApiError> {
        self.post_text(&format!("/api/rooms/{}/next", room_id), &json!({}))
            .await
    }

    pub async fn send_chat(
        &self,
        room_id: &str,
        req: &ChatMessageRequest,
    ) -> Result<String, RoomApiError> {
        self.post_text(&format!("/api/rooms/{}/chat", room_id), req)
            .await
    }

    pub async fn get_playlist(&self, room_id: &str) -> Result<PlaylistState, RoomApiError> {
        let url = format!("{}/api/rooms/{}/playlist", self.base_url, room_id);
        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(status_error(response.status()))
        }
    }

    pub async fn get_player_state(
        &self,
        room_id: &str,
    ) -> Result<PlayerStateSnapshot, RoomApiError> {
        let url = format!("{}/api/player/{}/state", self.base_url, room_id);
        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(status_error(response.status()))
        }
    }

    pub async fn get_chat_history(&self, room_id: &str) -> Result<Vec<ChatLine>, RoomApiError> {
        let url = format!("{}/api/chat/{}/history", self.base_url, room_id);
        let response = self.client.get(&url).send().await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(status_error(response.status()))
        }
    }

    /// POST a JSON body to a text-answering endpoint.
    async fn post_text<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<String, RoomApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);
        let response = self.client.post(&url).json(body).send().await?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            Err(status_error(response.status()))
        }
    }
}

fn status_error(status: reqwest::StatusCode) -> RoomApiError {
    if status == reqwest::StatusCode::NOT_FOUND {
        RoomApiError::NotFound
    } else {
        RoomApiError::Status(status.as_u16())
    }
}
