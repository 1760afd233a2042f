//! Shared test harness for agent integration tests.
//!
//! [`FakeAuthority`] serves the manifest, status, and media endpoints from an
//! Axum server on a random port. [`FakePlayback`] records the commands the
//! agent issues instead of driving a real player.

#![allow(dead_code)]

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use signage_agent::config::Config;
use signage_common::Rotation;
use signage_player::Playback;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    manifest: Value,
    files: HashMap<String, Vec<u8>>,
    statuses: Vec<String>,
    downloads: Vec<String>,
    fail_manifest: bool,
    fail_status: bool,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<Inner>>);

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.0.lock().unwrap()
    }
}

/// In-process authority.
pub struct FakeAuthority {
    pub addr: SocketAddr,
    shared: Shared,
}

impl FakeAuthority {
    pub async fn start() -> Self {
        let shared = Shared::default();
        shared.lock().manifest = json!({"mode": "single", "all_videos": []});

        let app = Router::new()
            .route("/api/manifest", get(manifest))
            .route("/api/status", post(status))
            .route("/static/videos/{filename}", get(video))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, shared }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_manifest(&self, manifest: Value) {
        self.shared.lock().manifest = manifest;
    }

    pub fn add_file(&self, name: &str, body: &[u8]) {
        self.shared.lock().files.insert(name.to_string(), body.to_vec());
    }

    pub fn fail_manifest(&self, fail: bool) {
        self.shared.lock().fail_manifest = fail;
    }

    pub fn fail_status(&self, fail: bool) {
        self.shared.lock().fail_status = fail;
    }

    /// `current_video` of every status report received, in order.
    pub fn statuses(&self) -> Vec<String> {
        self.shared.lock().statuses.clone()
    }

    /// File names requested from the media endpoint, in order.
    pub fn downloads(&self) -> Vec<String> {
        self.shared.lock().downloads.clone()
    }

    /// Agent config pointed at this authority with a fast poll interval.
    pub fn config(&self, cache_dir: &Path) -> Config {
        let mut config = Config::default();
        config.authority.url = self.url();
        config.agent.cache_dir = cache_dir.to_path_buf();
        config.agent.poll_interval_ms = 10;
        config
    }
}

async fn manifest(State(shared): State<Shared>) -> Response {
    let inner = shared.lock();
    if inner.fail_manifest {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    Json(inner.manifest.clone()).into_response()
}

async fn status(State(shared): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    let mut inner = shared.lock();
    let label = body["current_video"].as_str().unwrap_or_default().to_string();
    inner.statuses.push(label);
    if inner.fail_status {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    }
}

async fn video(State(shared): State<Shared>, UrlPath(filename): UrlPath<String>) -> Response {
    let mut inner = shared.lock();
    inner.downloads.push(filename.clone());
    match inner.files.get(&filename) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Play(PathBuf, Rotation, bool),
    Pause(bool),
    Rotate(Rotation),
    Stop,
}

/// Recording player. It is "playing" from an acknowledged play until
/// [`FakePlayback::finish`] or a stop.
#[derive(Debug, Default)]
pub struct FakePlayback {
    pub calls: Vec<Call>,
    pub playing: bool,
    pub rotation: Rotation,
}

impl FakePlayback {
    pub fn finish(&mut self) {
        self.playing = false;
    }

    pub fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// File names of every play, in order.
    pub fn played(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Play(path, _, _) => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Playback for FakePlayback {
    async fn play(&mut self, path: &Path, rotation: Rotation, looping: bool) -> bool {
        self.calls.push(Call::Play(path.to_path_buf(), rotation, looping));
        self.rotation = rotation;
        self.playing = true;
        true
    }

    async fn set_pause(&mut self, paused: bool) -> bool {
        self.calls.push(Call::Pause(paused));
        true
    }

    async fn set_rotation(&mut self, rotation: Rotation) -> bool {
        self.calls.push(Call::Rotate(rotation));
        self.rotation = rotation;
        true
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    async fn is_playing(&mut self) -> bool {
        self.playing
    }

    async fn stop(&mut self) {
        self.calls.push(Call::Stop);
        self.playing = false;
    }
}
