//! Local message channel to the player process.
//!
//! - `protocol.rs` - typed commands, replies, and newline-delimited JSON framing
//! - `channel.rs` - one connection per attempt, bounded retries

mod channel;
mod protocol;

pub use channel::{IpcChannel, RetryPolicy};
pub use protocol::{Command, Property, Reply};
