//! In-process stand-in for both backends, just enough surface for the
//! client and session tests to talk to over real HTTP.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct StubInner {
    snapshot: Value,
    playlist: Value,
    chat: Vec<Value>,
    calls: Vec<String>,
    legacy_status: Value,
    legacy_track: i64,
    legacy_position: u64,
}

#[derive(Clone, Default)]
struct StubState {
    inner: Arc<Mutex<StubInner>>,
}

/// A running stub server plus knobs to script its responses and inspect
/// what the client sent.
pub struct StubBackend {
    pub base_url: String,
    state: StubState,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = StubState::default();
        {
            let mut inner = state.inner.lock().unwrap();
            inner.snapshot = json!({ "status": "STOPPED", "positionMs": 0, "durationMs": 0 });
            inner.playlist = json!({ "tracks": [] });
            inner.legacy_status = json!("STOPPED");
        }

        let app = Router::new()
            .route("/api/rooms", post(create_room))
            .route("/api/rooms/:id/join", post(transport))
            .route("/api/rooms/:id/leave", post(transport))
            .route("/api/rooms/:id/play", post(transport))
            .route("/api/rooms/:id/pause", post(transport))
            .route("/api/rooms/:id/next", post(transport))
            .route("/api/rooms/:id/tracks", post(add_track))
            .route("/api/rooms/:id/tracks/:track/vote", post(vote))
            .route("/api/rooms/:id/chat", post(chat_send))
            .route("/api/rooms/:id/playlist", get(playlist))
            .route("/api/player/:id/state", get(player_state))
            .route("/api/chat/:id/history", get(chat_history))
            .route("/playerstate/add-player-state/:id", post(transport))
            .route("/playerstate/remove-player-state/:id", post(transport))
            .route("/playerstate/:id/toggle", post(transport))
            .route("/playerstate/:id/next", post(transport))
            .route("/playerstate/:id/prev", post(transport))
            .route("/playerstate/:id/status", get(legacy_status))
            .route("/playerstate/:id/current-track", get(legacy_track))
            .route("/playerstate/:id/current-position", get(legacy_position))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, state }
    }

    pub fn set_snapshot(&self, snapshot: Value) {
        self.state.inner.lock().unwrap().snapshot = snapshot;
    }

    pub fn set_playlist(&self, playlist: Value) {
        self.state.inner.lock().unwrap().playlist = playlist;
    }

    pub fn set_legacy_state(&self, status: &str, track: i64, position_ms: u64) {
        let mut inner = self.state.inner.lock().unwrap();
        inner.legacy_status = json!(status);
        inner.legacy_track = track;
        inner.legacy_position = position_ms;
    }

    /// Every mutating call the stub received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.inner.lock().unwrap().calls.clone()
    }

    pub fn chat_lines(&self) -> Vec<Value> {
        self.state.inner.lock().unwrap().chat.clone()
    }
}

async fn create_room(State(state): State<StubState>, Json(body): Json<Value>) -> Json<Value> {
    state.inner.lock().unwrap().calls.push("create-room".to_string());
    Json(json!({
        "roomId": "r-42",
        "userId": body["userId"],
        "roomName": body["roomName"].as_str().unwrap_or("New Room"),
    }))
}

/// Shared handler for every body-less transport POST: records the path.
async fn transport(State(state): State<StubState>, uri: axum::http::Uri) -> String {
    state
        .inner
        .lock()
        .unwrap()
        .calls
        .push(uri.path().to_string());
    "ok".to_string()
}

async fn add_track(State(state): State<StubState>, Json(body): Json<Value>) -> String {
    state
        .inner
        .lock()
        .unwrap()
        .calls
        .push(format!("tracks:{}", body));
    "track added".to_string()
}

async fn vote(
    State(state): State<StubState>,
    Path((_room, track)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> String {
    state
        .inner
        .lock()
        .unwrap()
        .calls
        .push(format!("vote:{}:{}", track, body["delta"]));
    "voted".to_string()
}

async fn chat_send(
    State(state): State<StubState>,
    Path(room): Path<String>,
    Json(body): Json<Value>,
) -> String {
    let mut inner = state.inner.lock().unwrap();
    inner.calls.push("chat".to_string());
    inner.chat.push(json!({
        "userId": body["userId"],
        "roomId": room,
        "message": body["message"],
        "ts": 1,
    }));
    "sent".to_string()
}

async fn playlist(State(state): State<StubState>) -> Json<Value> {
    Json(state.inner.lock().unwrap().playlist.clone())
}

async fn player_state(State(state): State<StubState>) -> Json<Value> {
    Json(state.inner.lock().unwrap().snapshot.clone())
}

async fn chat_history(State(state): State<StubState>) -> Json<Value> {
    Json(Value::Array(state.inner.lock().unwrap().chat.clone()))
}

async fn legacy_status(State(state): State<StubState>) -> Json<Value> {
    Json(state.inner.lock().unwrap().legacy_status.clone())
}

async fn legacy_track(State(state): State<StubState>) -> Json<Value> {
    Json(json!(state.inner.lock().unwrap().legacy_track))
}

async fn legacy_position(State(state): State<StubState>) -> Json<Value> {
    Json(json!(state.inner.lock().unwrap().legacy_position))
}
