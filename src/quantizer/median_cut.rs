use std::ops::Range;

use image::Rgba;
use log::{debug, trace};

use crate::{Color, Palette, Quantizer};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
struct Rgb<T> {
    r: T,
    g: T,
    b: T,
}

impl<T> Rgb<T> {
    fn map<O>(self, mut f: impl FnMut(T) -> O) -> Rgb<O> {
        Rgb {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }

    fn as_mut(&mut self) -> Rgb<&mut T> {
        Rgb {
            r: &mut self.r,
            g: &mut self.g,
            b: &mut self.b,
        }
    }

    fn zip<O>(self, other: Rgb<O>) -> Rgb<(T, O)> {
        Rgb {
            r: (self.r, other.r),
            g: (self.g, other.g),
            b: (self.b, other.b),
        }
    }
}

impl Rgb<u8> {
    fn from_rgba(Rgba([r, g, b, _]): Rgba<u8>) -> Self {
        Rgb { r, g, b }
    }

    fn into_image_rgb(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }

    /// `axis` first, the remaining channels break ties.
    fn key(&self, axis: Axis) -> [u8; 3] {
        let Rgb { r, g, b } = *self;
        match axis {
            Axis::R => [r, g, b],
            Axis::G => [g, r, b],
            Axis::B => [b, r, g],
        }
    }

    fn channel(&self, axis: Axis) -> u8 {
        self.key(axis)[0]
    }
}

#[derive(Debug, Copy, Clone)]
struct MinMax<T> {
    min: T,
    max: T,
}

impl<T: Ord + Copy> MinMax<T> {
    fn from_value(value: T) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    fn extend(&mut self, value: T) {
        if value < self.min {
            self.min = value;
        }
        if self.max < value {
            self.max = value;
        }
    }
}

impl MinMax<u8> {
    fn spread(&self) -> u8 {
        self.max - self.min
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Axis {
    R,
    G,
    B,
}

/// Tight per-channel bounds of the colors in a box
#[derive(Debug, Copy, Clone)]
struct Bounds(Rgb<MinMax<u8>>);

impl Bounds {
    fn new(color: Rgb<u8>) -> Self {
        Self(color.map(MinMax::from_value))
    }

    fn extend(&mut self, color: Rgb<u8>) {
        self.0.as_mut().zip(color).map(|(mm, c)| mm.extend(c));
    }

    fn spread(&self) -> Rgb<u8> {
        self.0.map(|mm| mm.spread())
    }

    fn longest_axis(&self) -> Axis {
        let Rgb { r, g, b } = self.spread();
        if r >= g && r >= b {
            Axis::R
        } else if g >= b {
            Axis::G
        } else {
            Axis::B
        }
    }

    /// A single distinct color
    fn is_point(&self) -> bool {
        self.spread() == Rgb::default()
    }
}

/// A range of the shared color buffer together with its bounds
#[derive(Debug)]
struct ColorBox {
    range: Range<usize>,
    bounds: Bounds,
}

impl ColorBox {
    fn from_range(colors: &[Rgb<u8>], range: Range<usize>) -> Self {
        debug_assert!(!range.is_empty());
        let slice = &colors[range.clone()];
        let mut bounds = Bounds::new(slice[0]);
        for &color in &slice[1..] {
            bounds.extend(color);
        }
        Self { range, bounds }
    }

    fn population(&self) -> usize {
        self.range.len()
    }

    fn is_splittable(&self) -> bool {
        !self.bounds.is_point()
    }

    /// Rounded component-wise mean
    fn average(&self, colors: &[Rgb<u8>]) -> Color {
        let sum = colors[self.range.clone()]
            .iter()
            .fold(Rgb::<u64>::default(), |acc, &color| {
                acc.zip(color).map(|(a, c)| a + u64::from(c))
            });
        let population = self.population() as u64;
        let color = sum
            .map(|s| ((s + population / 2) / population) as u8)
            .into_image_rgb();
        Color {
            color,
            population: self.population(),
        }
    }

    /// Sorts the box along its longest axis and cuts it in two at the median.
    fn split(&self, colors: &mut [Rgb<u8>]) -> (ColorBox, ColorBox) {
        let axis = self.bounds.longest_axis();
        let slice = &mut colors[self.range.clone()];
        slice.sort_unstable_by_key(|c| c.key(axis));
        let cut = self.range.start + cut_point(slice, axis);
        trace!(
            "splitting {:?} along {:?} at {} ({} pixels)",
            self.range,
            axis,
            cut,
            self.population()
        );
        (
            ColorBox::from_range(colors, self.range.start..cut),
            ColorBox::from_range(colors, cut..self.range.end),
        )
    }
}

/// Index closest to the median at which the axis value changes.
///
/// Identical colors always end up on the same side, so the halves never share a color. `colors`
/// must be sorted along `axis` and span more than one value on it.
fn cut_point(colors: &[Rgb<u8>], axis: Axis) -> usize {
    let median = colors.len() / 2;
    colors
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0].channel(axis) != pair[1].channel(axis))
        .map(|(i, _)| i + 1)
        .min_by_key(|&cut| cut.abs_diff(median))
        .unwrap_or(median)
}

fn split_boxes(boxes: &mut Vec<ColorBox>, colors: &mut [Rgb<u8>], target: usize) {
    while boxes.len() < target {
        // max_by_key keeps the last maximum, walking backwards lets the earliest box win ties
        let Some(index) = boxes
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, vbox)| vbox.is_splittable())
            .max_by_key(|(_, vbox)| vbox.population())
            .map(|(index, _)| index)
        else {
            // Every box holds a single color
            break;
        };

        let (lower, upper) = boxes[index].split(colors);
        boxes[index] = lower;
        boxes.insert(index + 1, upper);
    }
}

/// Median cut quantizer
///
/// Repeatedly splits the most populated box of colors at the median of its widest channel, then
/// averages every box into one palette color. Boxes keep their creation order, which is also the
/// palette order.
#[derive(Debug, Default, Clone, Copy)]
pub struct MedianCut;

impl Quantizer for MedianCut {
    fn quantize<I>(&self, pixels: I, colors: usize) -> Palette
    where
        I: IntoIterator<Item = Rgba<u8>>,
    {
        let mut arena: Vec<Rgb<u8>> = pixels.into_iter().map(Rgb::<u8>::from_rgba).collect();
        if arena.is_empty() || colors == 0 {
            return Palette::default();
        }

        let mut boxes = vec![ColorBox::from_range(&arena, 0..arena.len())];
        split_boxes(&mut boxes, &mut arena, colors);
        debug!(
            "median cut reduced {} pixels to {} colors",
            arena.len(),
            boxes.len()
        );

        boxes.iter().map(|vbox| vbox.average(&arena)).collect()
    }
}
