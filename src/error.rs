use std::path::PathBuf;

use thiserror::Error;

/// Library error type for colorflow operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The leading bytes match no supported image signature.
    #[error("invalid image format: {0}")]
    InvalidFormat(String),

    /// The image is truncated, inconsistent, or failed to decompress.
    #[error("corrupt image data: {0}")]
    CorruptData(String),

    /// The format is recognized but this variant of it is not implemented.
    #[error("unsupported image feature: {0}")]
    UnsupportedFeature(String),

    /// There were no pixels to average.
    #[error("image contains no pixels to average")]
    EmptyImage,

    /// Frame percentage outside of `(0, 100]`.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The input could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fieldless discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidFormat,
    CorruptData,
    UnsupportedFeature,
    EmptyImage,
    InvalidFrame,
    Io,
}

impl Error {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Self::CorruptData(_) => ErrorKind::CorruptData,
            Self::UnsupportedFeature(_) => ErrorKind::UnsupportedFeature,
            Self::EmptyImage => ErrorKind::EmptyImage,
            Self::InvalidFrame(_) => ErrorKind::InvalidFrame,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptData(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFeature(msg.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
