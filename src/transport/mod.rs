//! Transport layer for card reader I/O abstraction

use crate::error::Result;

mod mock;
mod pcsc;
pub use mock::{ConnectOutcome, MockTransport};
pub use pcsc::PcscTransport;

/// Transport trait for page-addressable card communication
///
/// Implementations address exactly one reader (the first one enumerated)
/// and at most one card session at a time. A connect/disconnect pair is a
/// scoped acquisition: callers must disconnect on every exit path of a
/// connected session, including error paths.
pub trait CardTransport: Send {
    /// Open a session with the card currently on the reader.
    ///
    /// Fails with [`crate::Error::NoReaderFound`] when no reader is
    /// enumerated at all, or [`crate::Error::NoCard`] when the reader is
    /// there but no card answers.
    fn connect(&mut self) -> Result<()>;

    /// Close the current session. Idempotent; errors are swallowed so this
    /// can run on every exit path.
    fn disconnect(&mut self);

    /// Read the card-assigned identifier (4-8 bytes).
    ///
    /// Cheap enough to poll for presence. Any non-OK status or transport
    /// fault fails with [`crate::Error::NoCard`].
    fn get_identifier(&mut self) -> Result<Vec<u8>>;

    /// Read exactly 4 bytes from a page.
    fn read_page(&mut self, page: u8) -> Result<[u8; 4]>;

    /// Write exactly 4 bytes to a page.
    fn write_page(&mut self, page: u8, data: [u8; 4]) -> Result<()>;
}
