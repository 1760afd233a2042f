//! Failure signature matching over player diagnostic logs.
//!
//! A player can come up, open its IPC socket, and still be unable to put
//! pixels on screen (mode-set refused, no connector, no DRM permission). The
//! only trace is in its log, so each launch's log tail is checked against an
//! ordered list of known fatal substrings.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Ordered list of fatal log substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureSignatures {
    patterns: Vec<String>,
    tail_bytes: u64,
}

impl FailureSignatures {
    pub fn new(patterns: Vec<String>, tail_bytes: u64) -> Self {
        Self {
            patterns,
            tail_bytes,
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// First pattern, in list order, that occurs in `text`.
    pub fn find<'a>(&'a self, text: &str) -> Option<&'a str> {
        self.patterns
            .iter()
            .find(|p| !p.is_empty() && text.contains(p.as_str()))
            .map(String::as_str)
    }

    /// Scan the tail of the log at `path`.
    ///
    /// A missing log is not a failure: some players only create it lazily.
    pub fn scan_file(&self, path: &Path) -> std::io::Result<Option<String>> {
        let tail = match read_tail(path, self.tail_bytes) {
            Ok(tail) => tail,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(self.find(&tail).map(str::to_string))
    }
}

/// Read the last `max_bytes` of a file as lossy UTF-8.
fn read_tail(path: &Path, max_bytes: u64) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let len = file.metadata()?.len();
    if len > max_bytes {
        file.seek(SeekFrom::Start(len - max_bytes))?;
    }

    let mut buf = Vec::with_capacity(len.min(max_bytes) as usize);
    file.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
