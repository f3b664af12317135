use std::io;

use image::{ImageError, ImageFormat};
use thiserror::Error;

/// Result type used by the decoding half of the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which resource ceiling an image ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    /// The stream held more bytes than allowed.
    Bytes {
        /// Byte ceiling that was reached
        max: u64,
    },
    /// The declared dimensions exceed the pixel ceiling.
    Pixels {
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Pixel ceiling
        max: u64,
    },
    /// The codec refused to allocate the buffers the image needs.
    Allocation,
}

/// Errors when decoding an untrusted image
#[derive(Debug, Error)]
pub enum Error {
    /// The image was rejected by the size limits.
    #[error("image is too large ({0})")]
    ImageTooLarge(Ceiling),
    /// No registered codec recognises the header.
    #[error("unsupported image format")]
    UnsupportedFormat,
    /// A codec recognised the header but could not decode the data.
    #[error("invalid {format:?} image: {source}")]
    CorruptImage {
        /// Format the header was detected as
        format: ImageFormat,
        /// Codec error
        #[source]
        source: ImageError,
    },
    /// Reading the underlying stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Returns true if the input was rejected by policy rather than being an invalid image.
    pub fn is_too_large(&self) -> bool {
        matches!(self, Error::ImageTooLarge(_))
    }
}

impl std::fmt::Display for Ceiling {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Ceiling::Bytes { max } => write!(f, "more than {} bytes", max),
            Ceiling::Pixels { width, height, max } => {
                write!(f, "{}x{} pixels, limit is {}", width, height, max)
            }
            Ceiling::Allocation => write!(f, "allocation limit exceeded"),
        }
    }
}
