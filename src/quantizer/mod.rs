use image::Rgba;

mod median_cut;

pub use median_cut::MedianCut;

use crate::Palette;

/// Quantizer trait
pub trait Quantizer {
    /// Reduces the given colors to a palette of at most `colors` entries.
    ///
    /// Never pads: the palette has fewer entries when the input has fewer distinct colors, and is
    /// empty for empty input.
    fn quantize<I>(&self, pixels: I, colors: usize) -> Palette
    where
        I: IntoIterator<Item = Rgba<u8>>;
}
