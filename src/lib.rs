//! Find the dominant colors of images
//!
//! Untrusted input is decoded with [`Decoder`], which checks the declared dimensions and the
//! byte count against [`SizeLimits`] before committing to a full decode. The pixels are then
//! reduced to a short palette with the [`MedianCut`] quantizer.
//!
//! ```no_run
//! # fn main() -> colorbot::Result<()> {
//! let file = std::fs::File::open("logo.png")?;
//! let image = colorbot::decode_image(file, 10 * 1024 * 1024, 10 * 1024 * 1024)?;
//! for color in &colorbot::dominant_colors(&image.pixels, 5) {
//!     println!("{}", color);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

use image::{GenericImageView, Pixel};

pub use codec::{Codec, Codecs, FormatCodec};
pub use decoder::{decode_image, DecodedImage, Decoder, SizeLimits};
pub use error::{Ceiling, Error, Result};
pub use palette::{Color, Palette};
pub use quantizer::*;

mod codec;
mod decoder;
mod error;
mod palette;
mod quantizer;

/// Returns the `n` most dominant colors of the image.
///
/// Uses median cut quantization over every pixel, alpha is ignored. The palette has fewer than
/// `n` colors if the image has fewer distinct colors.
pub fn dominant_colors<I, P>(image: &I, n: usize) -> Palette
where
    P: Pixel<Subpixel = u8>,
    I: GenericImageView<Pixel = P>,
{
    MedianCut.quantize(image.pixels().map(|(_, _, pixel)| pixel.to_rgba()), n)
}
