//! Shared helpers for player integration tests.
//!
//! Real `sh`/`sleep` processes stand in for mpv, and [`FakeMpv`] answers the
//! JSON IPC protocol on a Unix socket.

#![allow(dead_code)]

use serde_json::{json, Value};
use signage_player::{HardwareProfile, LaunchStrategy, PlayerConfig, RetryPolicy};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

/// Player config whose profiles are shell snippets, with short timings.
pub fn shell_config(dir: &Path, profiles: &[(&str, &str)]) -> PlayerConfig {
    PlayerConfig {
        program: "sh".to_string(),
        ipc_path: dir.join("mpv.sock"),
        log_dir: dir.to_path_buf(),
        launch: LaunchStrategy::Fallback,
        settle_ms: 150,
        quit_timeout_ms: 200,
        base_args: vec![],
        profiles: profiles
            .iter()
            .map(|(name, script)| HardwareProfile::new(name, &["-c", script]))
            .collect(),
        ipc: RetryPolicy {
            attempts: 2,
            timeout_ms: 300,
            backoff_ms: 10,
        },
        ..PlayerConfig::default()
    }
}

/// In-process stand-in for mpv's IPC server.
#[derive(Clone, Default)]
pub struct FakeMpv {
    properties: Arc<Mutex<HashMap<String, Value>>>,
    commands: Arc<Mutex<Vec<Vec<Value>>>>,
    refused: Arc<Mutex<HashSet<String>>>,
}

impl FakeMpv {
    /// Bind at `path` and serve until the test ends.
    pub fn serve(path: &Path) -> Self {
        let fake = Self::default();
        fake.set("idle-active", json!(true));
        fake.set("mpv-version", json!("mpv 0.35.1"));

        let listener = UnixListener::bind(path).expect("failed to bind fake mpv socket");
        let server = fake.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let server = server.clone();
                tokio::spawn(async move {
                    let (read, mut write) = stream.into_split();
                    let mut lines = BufReader::new(read).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        let reply = server.handle(&line);
                        let mut frame = reply.to_string();
                        frame.push('\n');
                        // Fire-and-forget senders hang up before reading.
                        let _ = write.write_all(frame.as_bytes()).await;
                    }
                });
            }
        });

        fake
    }

    pub fn set(&self, name: &str, value: Value) {
        self.properties
            .lock()
            .unwrap()
            .insert(name.to_string(), value);
    }

    /// Make `set_property` on `name` fail until [`FakeMpv::accept`].
    pub fn refuse(&self, name: &str) {
        self.refused.lock().unwrap().insert(name.to_string());
    }

    pub fn accept(&self, name: &str) {
        self.refused.lock().unwrap().remove(name);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.properties.lock().unwrap().get(name).cloned()
    }

    /// Every command received, in order.
    pub fn commands(&self) -> Vec<Vec<Value>> {
        self.commands.lock().unwrap().clone()
    }

    fn handle(&self, line: &str) -> Value {
        let request: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(_) => return json!({"error": "invalid parameter"}),
        };
        let args = request["command"].as_array().cloned().unwrap_or_default();
        self.commands.lock().unwrap().push(args.clone());

        let name = args.first().and_then(Value::as_str).unwrap_or_default();
        match name {
            "loadfile" => {
                self.set("path", args[1].clone());
                self.set("idle-active", json!(false));
                json!({"error": "success", "data": null})
            }
            "set_property" => {
                let prop = args[1].as_str().unwrap_or_default();
                if self.refused.lock().unwrap().contains(prop) {
                    return json!({"error": "property unavailable"});
                }
                self.set(prop, args[2].clone());
                json!({"error": "success", "data": null})
            }
            "get_property" => {
                let prop = args[1].as_str().unwrap_or_default();
                match self.get(prop) {
                    Some(value) => json!({"error": "success", "data": value}),
                    None => json!({"error": "property unavailable"}),
                }
            }
            "quit" => json!({"error": "success", "data": null}),
            _ => json!({"error": "invalid parameter"}),
        }
    }
}
