use std::fmt;
use std::io::{Cursor, Read};

use image::{DynamicImage, ImageError, ImageFormat, ImageReader, ImageResult};

/// Decoding capability for a single image format
pub trait Codec: Send + Sync {
    /// Format decoded by this codec
    fn format(&self) -> ImageFormat;

    /// Returns true if the header starts with one of this format's signatures.
    fn matches(&self, header: &[u8]) -> bool;

    /// Parses the declared `(width, height)` from the header bytes alone.
    fn dimensions(&self, header: &[u8]) -> ImageResult<(u32, u32)>;

    /// Decodes the first frame of the image read from `stream`.
    fn decode(&self, stream: &mut dyn Read) -> ImageResult<DynamicImage>;

    /// Returns true if `tail`, the last (up to 64) bytes read, ends with the format's end marker.
    ///
    /// Consulted when the byte ceiling cut the stream off, since some decoders return an image
    /// for truncated data. The default treats every such stream as incomplete.
    fn is_complete(&self, tail: &[u8]) -> bool {
        let _ = tail;
        false
    }
}

const GIF_SIGNATURES: &[&[u8]] = &[b"GIF87a", b"GIF89a"];
const JPEG_SIGNATURES: &[&[u8]] = &[b"\xFF\xD8"];
const PNG_SIGNATURES: &[&[u8]] = &[b"\x89PNG\r\n\x1A\n"];

const GIF_TRAILER: &[u8] = b";";
const JPEG_TRAILER: &[u8] = b"\xFF\xD9";
// empty IEND chunk with its CRC
const PNG_TRAILER: &[u8] = b"\0\0\0\0IEND\xAE\x42\x60\x82";

/// Codec backed by the decoders of the `image` crate
#[derive(Debug, Clone, Copy)]
pub struct FormatCodec {
    format: ImageFormat,
    signatures: &'static [&'static [u8]],
    trailer: &'static [u8],
}

impl FormatCodec {
    /// Codec for `format`, selected when the header starts with any of `signatures`.
    ///
    /// `trailer` is the marker a complete stream ends with.
    pub const fn new(
        format: ImageFormat,
        signatures: &'static [&'static [u8]],
        trailer: &'static [u8],
    ) -> Self {
        Self {
            format,
            signatures,
            trailer,
        }
    }

    /// GIF87a and GIF89a
    pub const fn gif() -> Self {
        Self::new(ImageFormat::Gif, GIF_SIGNATURES, GIF_TRAILER)
    }

    /// JPEG (SOI marker)
    pub const fn jpeg() -> Self {
        Self::new(ImageFormat::Jpeg, JPEG_SIGNATURES, JPEG_TRAILER)
    }

    /// PNG
    pub const fn png() -> Self {
        Self::new(ImageFormat::Png, PNG_SIGNATURES, PNG_TRAILER)
    }
}

impl Codec for FormatCodec {
    fn format(&self) -> ImageFormat {
        self.format
    }

    fn matches(&self, header: &[u8]) -> bool {
        self.signatures.iter().any(|s| header.starts_with(s))
    }

    fn dimensions(&self, header: &[u8]) -> ImageResult<(u32, u32)> {
        let mut reader = ImageReader::with_format(Cursor::new(header), self.format);
        // only the header is parsed here, the pixel ceiling is enforced by the caller
        reader.no_limits();
        reader.into_dimensions()
    }

    fn decode(&self, stream: &mut dyn Read) -> ImageResult<DynamicImage> {
        // The stream is already capped by the byte ceiling.
        let mut data = Vec::new();
        stream.read_to_end(&mut data).map_err(ImageError::IoError)?;
        ImageReader::with_format(Cursor::new(data), self.format).decode()
    }

    fn is_complete(&self, tail: &[u8]) -> bool {
        !self.trailer.is_empty() && tail.ends_with(self.trailer)
    }
}

/// Table of codecs, tried in registration order
#[derive(Default)]
pub struct Codecs {
    codecs: Vec<Box<dyn Codec>>,
}

impl Codecs {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// GIF, JPEG and PNG
    pub fn standard() -> Self {
        Self::new()
            .with(FormatCodec::gif())
            .with(FormatCodec::jpeg())
            .with(FormatCodec::png())
    }

    /// Adds a codec and returns the table
    pub fn with(mut self, codec: impl Codec + 'static) -> Self {
        self.register(codec);
        self
    }

    /// Adds a codec
    pub fn register(&mut self, codec: impl Codec + 'static) {
        self.codecs.push(Box::new(codec));
    }

    /// First codec whose signature matches the header
    pub fn find(&self, header: &[u8]) -> Option<&dyn Codec> {
        self.codecs
            .iter()
            .map(|codec| codec.as_ref())
            .find(|codec| codec.matches(header))
    }

    /// Number of registered codecs
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Returns true if no codec is registered
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries(self.codecs.iter().map(|codec| codec.format()))
            .finish()
    }
}
