use std::io;

use thiserror::Error;

/// Enumerates high-level errors returned by this library.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Represents a date outside the calendar or the supported year range.
    #[error("invalid date: {year:04}-{month:02}-{day:02}")]
    InvalidDate { year: i32, month: u8, day: u8 },

    /// Represents a child name that is empty after trimming.
    #[error("name must not be empty")]
    EmptyName,

    /// Represents word text that is empty after trimming.
    #[error("word text must not be empty")]
    EmptyWordText,

    /// Represents an upload with no content.
    #[error("no file provided")]
    EmptyUpload,

    /// Represents an upload whose extension is missing or not in the
    /// allowed set.
    #[error("file type not allowed (allowed types: {allowed})")]
    UnsupportedType { allowed: String },

    /// Represents an upload larger than the configured ceiling.
    #[error("file too large (maximum size: {} MB)", .limit / (1024 * 1024))]
    FileTooLarge { limit: u64 },

    /// Represents a trim window that is empty or inverted.
    #[error("invalid trim range: start {start}s, end {end}s")]
    InvalidTrimRange { start: f64, end: f64 },

    /// Represents a failure while decoding or encoding media. The
    /// underlying cause is carried in the message.
    #[error("error processing media: {0}")]
    MediaProcessing(String),

    /// Represents an error creating a temporary file.
    #[error("unable to create temporary file")]
    TemporaryFileError(#[source] io::Error),

    /// Represents an error reading or writing stored files.
    #[error("I/O error")]
    Io(#[from] io::Error),

    /// Represents an error serializing the document.
    #[error("unable to serialize document")]
    Serialization(#[from] serde_json::Error),
}
