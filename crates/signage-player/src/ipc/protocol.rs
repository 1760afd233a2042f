//! mpv JSON IPC framing.
//!
//! Requests are `{"command": [...]}` followed by `\n`. Replies are
//! `{"error": "success" | <message>, "data": ...}`. The player may interleave
//! unsolicited `{"event": ...}` frames, which are skipped while waiting for a
//! reply.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use signage_common::Rotation;
use std::path::Path;

/// Player property addressed by get/set commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Pause,
    VideoRotate,
    LoopFile,
    /// `true` when no file is loaded or the last one finished.
    IdleActive,
    MpvVersion,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::VideoRotate => "video-rotate",
            Self::LoopFile => "loop-file",
            Self::IdleActive => "idle-active",
            Self::MpvVersion => "mpv-version",
        }
    }
}

/// A command the agent can send to the player.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace whatever is playing with `path`.
    LoadFile { path: String },
    SetProperty { property: Property, value: String },
    GetProperty(Property),
    Quit,
}

impl Command {
    pub fn load(path: &Path) -> Self {
        Self::LoadFile {
            path: path.to_string_lossy().into_owned(),
        }
    }

    pub fn set_pause(paused: bool) -> Self {
        Self::SetProperty {
            property: Property::Pause,
            value: yes_no(paused).to_string(),
        }
    }

    /// Rotation goes over the wire as text; some player versions reject a
    /// numeric value for this property.
    pub fn set_rotation(rotation: Rotation) -> Self {
        Self::SetProperty {
            property: Property::VideoRotate,
            value: rotation.to_string(),
        }
    }

    pub fn set_loop(looping: bool) -> Self {
        Self::SetProperty {
            property: Property::LoopFile,
            value: if looping { "inf" } else { "no" }.to_string(),
        }
    }

    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadFile { .. } => "loadfile",
            Self::SetProperty { .. } => "set_property",
            Self::GetProperty(_) => "get_property",
            Self::Quit => "quit",
        }
    }

    /// Positional arguments of the `command` array.
    pub fn args(&self) -> Vec<Value> {
        match self {
            Self::LoadFile { path } => vec![
                Value::from("loadfile"),
                Value::from(path.as_str()),
                Value::from("replace"),
            ],
            Self::SetProperty { property, value } => vec![
                Value::from("set_property"),
                Value::from(property.name()),
                Value::from(value.as_str()),
            ],
            Self::GetProperty(property) => {
                vec![Value::from("get_property"), Value::from(property.name())]
            }
            Self::Quit => vec![Value::from("quit")],
        }
    }

    /// Encode as one newline-terminated frame.
    pub fn encode(&self) -> Result<Vec<u8>> {
        #[derive(Serialize)]
        struct Request {
            command: Vec<Value>,
        }

        let mut frame = serde_json::to_vec(&Request {
            command: self.args(),
        })?;
        frame.push(b'\n');
        Ok(frame)
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Reply to a command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Reply {
    pub error: String,
    #[serde(default)]
    pub data: Value,
}

impl Reply {
    const SUCCESS: &'static str = "success";

    /// Reply synthesized for commands sent without waiting for an answer.
    pub fn accepted() -> Self {
        Self {
            error: Self::SUCCESS.to_string(),
            data: Value::Bool(true),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error == Self::SUCCESS
    }

    /// The reply payload when the command succeeded.
    pub fn into_data(self) -> Option<Value> {
        self.is_success().then_some(self.data)
    }
}

/// One decoded inbound line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    Reply(Reply),
    Event(String),
}

impl Frame {
    pub(crate) fn decode(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line.trim())?;

        if let Some(event) = value.get("event").and_then(Value::as_str) {
            return Ok(Self::Event(event.to_string()));
        }

        if value.get("error").is_none() {
            return Err(Error::protocol(format!(
                "frame has neither error nor event: {}",
                line.trim()
            )));
        }

        Ok(Self::Reply(serde_json::from_value(value)?))
    }
}
