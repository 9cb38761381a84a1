use alloc::string::String;

use crate::format::PixelFormat;

/// Errors from descriptor, conversion and codec operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImageError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("mip level {level} out of range (image has {levels} levels)")]
    LevelOutOfRange { level: u32, levels: u32 },

    #[error("unsupported conversion from {from:?} to {to:?}")]
    UnsupportedConversion { from: PixelFormat, to: PixelFormat },

    #[error("stream fault: {0}")]
    Stream(#[from] StreamError),

    #[error("failed to allocate {bytes} bytes")]
    AllocationFailed { bytes: usize },

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("no stream attached")]
    NoStream,

    #[error("image has no pixel format")]
    NoFormat,

    #[error("pixel format mismatch: expected {expected:?}, got {actual:?}")]
    FormatMismatch {
        expected: PixelFormat,
        actual: PixelFormat,
    },
}

/// Faults reported by an [`ImageStream`](crate::ImageStream).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StreamError {
    #[error("unexpected end of stream")]
    UnexpectedEof,

    #[error("stream is not readable")]
    NotReadable,

    #[error("stream is not writable")]
    NotWritable,

    #[cfg(feature = "std")]
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

