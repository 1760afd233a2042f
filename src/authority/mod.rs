//! Client side of the authority protocol: manifest polling, status
//! heartbeats, and media downloads.

mod client;

pub use client::AuthorityClient;
