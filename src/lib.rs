//! taglink - NFC player-card bridge
//!
//! This library provides the core components for exchanging a small
//! player-state record with page-addressable NFC cards over a PC/SC
//! reader: the page codec, the fixed memory layouts, the presence state
//! machine, and the read/write orchestration. The side-path that mirrors
//! records into a relational datastore lives in [`db`].
//!
//! The binary wraps these into three modes: a long-running presence
//! monitor emitting NDJSON events, and one-shot read/write commands.

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod layout;
pub mod monitor;
pub mod reader;
pub mod record;
pub mod transport;
pub mod writer;

// Re-export commonly used types
pub use error::{Error, Result};
pub use layout::{PageLayout, EXPANDED, PACKED};
pub use record::TagRecord;
