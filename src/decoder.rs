use std::io::{self, Cursor, Read};

use image::{ImageError, ImageFormat, RgbaImage};
use log::debug;

use crate::codec::Codecs;
use crate::error::{Ceiling, Error, Result};

/// Bytes read up front to sniff the declared dimensions
const MAX_HEADER_SIZE: u64 = 4096;

/// Bytes kept from the end of the stream for [`crate::Codec::is_complete`]
const TAIL_SIZE: usize = 64;

/// Resource ceilings for a single decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    /// Bytes read from the stream, at most
    pub max_bytes: u64,
    /// Declared `width * height`, at most
    pub max_pixels: u64,
}

impl SizeLimits {
    /// Limits with the given ceilings
    pub const fn new(max_bytes: u64, max_pixels: u64) -> Self {
        Self {
            max_bytes,
            max_pixels,
        }
    }
}

impl Default for SizeLimits {
    /// 10 MiB and 10 Mi pixels
    fn default() -> Self {
        Self::new(10 * 1024 * 1024, 10 * 1024 * 1024)
    }
}

/// A decoded image
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Format the header was detected as
    pub format: ImageFormat,
    /// First frame, 8 bits per channel
    pub pixels: RgbaImage,
}

impl DecodedImage {
    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Decodes untrusted images while enforcing [`SizeLimits`].
///
/// Only the first 4096 bytes are looked at before the declared dimensions are
/// checked, so an image declaring too many pixels is rejected before anything proportional to
/// its size is allocated. The header bytes are then replayed in front of the rest of the stream
/// for the full decode.
#[derive(Debug)]
pub struct Decoder {
    codecs: Codecs,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(Codecs::standard())
    }
}

impl Decoder {
    /// Decoder recognising the formats in `codecs`
    pub fn new(codecs: Codecs) -> Self {
        Self { codecs }
    }

    /// The codec table
    pub fn codecs(&self) -> &Codecs {
        &self.codecs
    }

    /// Decodes the image in `reader`.
    ///
    /// Never reads more than `limits.max_bytes` bytes. Fails with [`Error::ImageTooLarge`] when
    /// the declared pixel count exceeds `limits.max_pixels`, or when the byte ceiling cut the
    /// stream off before the image was complete.
    pub fn decode<R: Read>(&self, reader: R, limits: SizeLimits) -> Result<DecodedImage> {
        let mut limited = reader.take(limits.max_bytes);

        // A short read is fine, small images can be shorter than the header buffer.
        let mut header = Vec::new();
        limited
            .by_ref()
            .take(MAX_HEADER_SIZE)
            .read_to_end(&mut header)?;

        let codec = self.codecs.find(&header).ok_or(Error::UnsupportedFormat)?;
        let format = codec.format();
        let (width, height) = codec.dimensions(&header).map_err(|source| {
            if header.len() as u64 == MAX_HEADER_SIZE {
                debug!(
                    "{:?} header does not fit in the first {} bytes: {}",
                    format, MAX_HEADER_SIZE, source
                );
            }
            Error::CorruptImage { format, source }
        })?;
        debug!("{:?} header declares {}x{}", format, width, height);

        check_pixels(width, height, limits)?;

        let (result, tail) = {
            let mut stream = Tail::new(Cursor::new(header).chain(limited.by_ref()));
            let result = codec.decode(&mut stream);
            (result, stream.tail)
        };
        let byte_ceiling_reached = limited.limit() == 0;

        let image = match result {
            // lenient decoders fill in missing data, so a cut-off stream can still decode
            Ok(_) if byte_ceiling_reached && !codec.is_complete(&tail) => {
                debug!("stream cut off at the byte ceiling before the end marker");
                return Err(Error::ImageTooLarge(Ceiling::Bytes {
                    max: limits.max_bytes,
                }));
            }
            Ok(image) => image,
            Err(err) if byte_ceiling_reached => {
                debug!("decoding stopped at the byte ceiling: {}", err);
                return Err(Error::ImageTooLarge(Ceiling::Bytes {
                    max: limits.max_bytes,
                }));
            }
            Err(err) => return Err(classify(format, err)),
        };

        let pixels = image.into_rgba8();
        // the decoded frame, not the header, decides what gets handed to the quantizer
        check_pixels(pixels.width(), pixels.height(), limits)?;

        Ok(DecodedImage { format, pixels })
    }
}

/// Passes reads through, remembering the last [`TAIL_SIZE`] bytes.
struct Tail<R> {
    inner: R,
    tail: Vec<u8>,
}

impl<R: Read> Tail<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            tail: Vec::with_capacity(2 * TAIL_SIZE),
        }
    }
}

impl<R: Read> Read for Tail<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.tail.extend_from_slice(&buf[n.saturating_sub(TAIL_SIZE)..n]);
        let excess = self.tail.len().saturating_sub(TAIL_SIZE);
        self.tail.drain(..excess);
        Ok(n)
    }
}

fn check_pixels(width: u32, height: u32, limits: SizeLimits) -> Result<()> {
    let pixels = u64::from(width) * u64::from(height);
    if pixels > limits.max_pixels {
        debug!(
            "rejecting {}x{} image, pixel ceiling is {}",
            width, height, limits.max_pixels
        );
        return Err(Error::ImageTooLarge(Ceiling::Pixels {
            width,
            height,
            max: limits.max_pixels,
        }));
    }
    Ok(())
}

/// Maps a codec failure that happened below the byte ceiling.
fn classify(format: ImageFormat, err: ImageError) -> Error {
    match err {
        ImageError::Limits(_) => Error::ImageTooLarge(Ceiling::Allocation),
        ImageError::IoError(err) if err.kind() != io::ErrorKind::UnexpectedEof => Error::Io(err),
        source => Error::CorruptImage { format, source },
    }
}

/// Decodes a GIF, JPEG or PNG image with the given ceilings.
///
/// See [`Decoder::decode`].
pub fn decode_image<R: Read>(reader: R, max_bytes: u64, max_pixels: u64) -> Result<DecodedImage> {
    Decoder::default().decode(reader, SizeLimits::new(max_bytes, max_pixels))
}
