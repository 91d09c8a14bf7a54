//! Monitor event stream
//!
//! Events are newline-delimited JSON objects written through an injected
//! sink, in emission order, one flush per event. Diagnostics go to the log
//! (stderr), never into the stream.

use crate::error::Result;
use crate::record::TagRecord;
use serde::Serialize;
use std::io::Write;

/// An event emitted by the presence monitor.
///
/// A `data` event is always followed, chronologically, by exactly one
/// `removed` event when that card leaves. A swap collapses to `removed`;
/// the new card produces its own `data` event on a later tick.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CardEvent {
    /// A card was detected and fully read
    Data {
        /// The assembled record
        payload: TagRecord,
    },
    /// The present card was removed (or swapped out)
    Removed,
}

/// NDJSON event writer over any byte sink.
pub struct EventWriter<W: Write> {
    sink: W,
}

impl<W: Write> EventWriter<W> {
    /// Wrap a sink. The monitor binary passes a locked stdout handle.
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Serialize one event followed by a newline and flush immediately,
    /// so the consumer sees it without output buffering delays.
    pub fn emit(&mut self, event: &CardEvent) -> Result<()> {
        serde_json::to_writer(&mut self.sink, event)?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()?;
        Ok(())
    }
}
