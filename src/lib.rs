//! featureboard - An in-memory feature request service with a TCP interface
//!
//! This library provides a concurrent feature request board with:
//! - TCP server interface with a line-oriented protocol
//! - Reader/writer-locked in-memory record store
//! - Typed async client
//! - Concurrent client support

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;
pub mod store;

pub use error::{FeatureBoardError, Result};
pub use store::{Feature, FeatureSummary, MemoryStore, Store};
pub use protocol::{AddRequest, Command, Response};
pub use client::Client;
pub use server::{FeatureBoardServer, ServerConfig};
