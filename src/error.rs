//! Error types for taglink

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// taglink error types
///
/// Hardware errors are retryable by design: the monitor loop converts them
/// into state transitions rather than terminating. One-shot modes surface
/// them as a non-zero process exit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No PC/SC reader enumerated at all (retryable with a longer backoff)
    #[error("No card reader found")]
    NoReaderFound,

    /// No card on the reader, or the card stopped answering
    #[error("No card present")]
    NoCard,

    /// PC/SC layer error
    #[error("PC/SC error: {0}")]
    Pcsc(#[from] pcsc::Error),

    /// A single page read failed (non-OK status word or transport fault)
    #[error("Failed to read page {page}")]
    PageRead {
        /// Page index of the failed read
        page: u8,
    },

    /// A single page write failed; pages written before it are left as-is
    #[error("Failed to write page {page}")]
    PageWrite {
        /// Page index of the failed write
        page: u8,
    },

    /// A mandatory region could not be read in full; no partial record is produced
    #[error("Incomplete read: page {page} failed")]
    IncompleteRead {
        /// First page that failed
        page: u8,
    },

    /// Input rejected before any hardware I/O
    #[error("Invalid {field}: {reason}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Stat value outside the encodable range [0, 65535]
    #[error("Value {value} out of range (0-65535)")]
    Range {
        /// The rejected value
        value: i64,
    },

    /// Malformed payload (e.g. more than 4 bytes for a page)
    #[error("Format error: {0}")]
    Format(String),

    /// No card appeared within the write operation's bounded wait
    #[error("Timed out waiting for a card")]
    Timeout,

    /// Database error (logged, never fatal to card operations)
    #[error("Persistence error: {0}")]
    Persistence(#[from] mysql::Error),

    /// I/O error (event sink)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
