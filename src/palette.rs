use std::fmt;
use std::iter::FromIterator;
use std::ops::Index;
use std::slice;

use image::Rgb;
use itertools::Itertools;

/// Palette of colors, in the order the quantizer produced them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Palette {
    /// Palette of Colors
    pub palette: Vec<Color>,
}

/// Color with population
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct Color {
    /// Color
    pub color: Rgb<u8>,
    /// Number of pixels the color stands for
    pub population: usize,
}

impl Color {
    /// `#rrggbb`
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.color.0;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl Palette {
    /// Number of colors
    pub fn len(&self) -> usize {
        self.palette.len()
    }

    /// Returns true if the palette has no colors
    pub fn is_empty(&self) -> bool {
        self.palette.is_empty()
    }

    /// Iterates over the colors in palette order
    pub fn iter(&self) -> slice::Iter<'_, Color> {
        self.palette.iter()
    }

    /// The plain RGB values, without populations
    pub fn colors(&self) -> Vec<Rgb<u8>> {
        self.palette.iter().map(|c| c.color).collect()
    }
}

impl FromIterator<Color> for Palette {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        Palette {
            palette: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Palette {
    type Item = Color;
    type IntoIter = std::vec::IntoIter<Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.palette.into_iter()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a Color;
    type IntoIter = slice::Iter<'a, Color>;

    fn into_iter(self) -> Self::IntoIter {
        self.palette.iter()
    }
}

impl Index<usize> for Palette {
    type Output = Color;

    fn index(&self, index: usize) -> &Color {
        &self.palette[index]
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let color_list = self.palette.iter().map(Color::to_hex).join(", ");

        write!(f, "Color Palette {{ {} }}", color_list)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
