use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for creating a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_name: Option<String>,
}

/// Response from room creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub user_id: String,
    pub room_name: String,
}

/// Request body for joining (or leaving) a room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomRequest {
    pub user_id: String,
}

/// Request body for adding a track to the shared playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddTrackRequest {
    pub user_id: String,
    pub track_url: String,
    pub track_title: String,
    pub duration_ms: u64,
}

/// Default track duration when the caller doesn't supply one
pub const DEFAULT_TRACK_DURATION_MS: u64 = 180_000;

/// Request body for voting on a track (delta is +1 / -1)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteTrackRequest {
    pub user_id: String,
    pub delta: i32,
}

/// Request body for posting a chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageRequest {
    pub user_id: String,
    pub message: String,
}

/// One chat history line, `ts` is epoch millis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatLine {
    pub user_id: String,
    pub room_id: String,
    pub message: String,
    pub ts: i64,
}

/// One entry of the shared playlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistTrack {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub duration_ms: u64,
    pub score: i64,
    pub added_at: DateTime<Utc>,
    pub added_by: String,
}

/// Playlist snapshot as reported by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistState {
    #[serde(default)]
    pub tracks: Vec<PlaylistTrack>,
}

/// Player transport status, UPPERCASE on the wire.
///
/// The backend has been observed sending mixed-case values, so decoding is
/// case-insensitive; anything unrecognized maps to `Stopped`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlayerStatus {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlayerStatus {
    pub fn is_playing(self) -> bool {
        matches!(self, PlayerStatus::Playing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerStatus::Playing => "PLAYING",
            PlayerStatus::Paused => "PAUSED",
            PlayerStatus::Stopped => "STOPPED",
        }
    }
}

impl Serialize for PlayerStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlayerStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_ascii_uppercase().as_str() {
            "PLAYING" => PlayerStatus::Playing,
            "PAUSED" => PlayerStatus::Paused,
            _ => PlayerStatus::Stopped,
        })
    }
}

/// One authoritative player-state reading from the backend.
///
/// Immutable once received; superseded by the next poll.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStateSnapshot {
    #[serde(default)]
    pub status: PlayerStatus,
    #[serde(default)]
    pub position_ms: u64,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub current_url: Option<String>,
    #[serde(default)]
    pub current_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_wire_form_is_camel_case() {
        let json = r#"{
            "status": "PLAYING",
            "positionMs": 10000,
            "durationMs": 200000,
            "currentUrl": "http://cdn/track.mp3",
            "currentTitle": "Song"
        }"#;
        let snap: PlayerStateSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.status, PlayerStatus::Playing);
        assert_eq!(snap.position_ms, 10_000);
        assert_eq!(snap.current_url.as_deref(), Some("http://cdn/track.mp3"));

        let out = serde_json::to_value(&snap).unwrap();
        assert_eq!(out["positionMs"], 10_000);
        assert_eq!(out["status"], "PLAYING");
    }

    #[test]
    fn status_decodes_case_insensitively_and_defaults_to_stopped() {
        let playing: PlayerStatus = serde_json::from_str("\"playing\"").unwrap();
        assert_eq!(playing, PlayerStatus::Playing);

        let unknown: PlayerStatus = serde_json::from_str("\"BUFFERING\"").unwrap();
        assert_eq!(unknown, PlayerStatus::Stopped);
    }

    #[test]
    fn snapshot_tolerates_missing_fields() {
        let snap: PlayerStateSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snap.status, PlayerStatus::Stopped);
        assert_eq!(snap.position_ms, 0);
        assert!(snap.current_url.is_none());
    }

    #[test]
    fn playlist_track_parses_iso_added_at() {
        let json = r#"{
            "tracks": [{
                "id": 7,
                "url": "http://cdn/a.mp3",
                "title": "A",
                "durationMs": 180000,
                "score": 3,
                "addedAt": "2024-05-01T12:00:00Z",
                "addedBy": "alice"
            }]
        }"#;
        let state: PlaylistState = serde_json::from_str(json).unwrap();
        assert_eq!(state.tracks.len(), 1);
        assert_eq!(state.tracks[0].score, 3);
        assert_eq!(state.tracks[0].added_by, "alice");
    }

    #[test]
    fn create_room_request_omits_missing_name() {
        let req = CreateRoomRequest {
            user_id: "u1".into(),
            room_name: None,
        };
        let out = serde_json::to_string(&req).unwrap();
        assert_eq!(out, r#"{"userId":"u1"}"#);
    }
}
