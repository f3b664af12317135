#![allow(dead_code)]

//! Fixture builders. Images are encoded in memory with the `image` encoders so no binary
//! fixtures need to be checked in.

use std::io::{self, Read};

use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

pub fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbaImage {
    let [r, g, b] = color;
    RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]))
}

/// Incompressible pixels, xorshift32
pub fn noise(width: u32, height: u32, seed: u32) -> RgbaImage {
    let mut state = seed;
    RgbaImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, _] = state.to_le_bytes();
        Rgba([r, g, b, 255])
    })
}

pub fn png(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .expect("png encoding");
    out
}

pub fn jpeg(image: &RgbaImage) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, 90)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .expect("jpeg encoding");
    out
}

pub fn gif(image: &RgbaImage) -> Vec<u8> {
    let mut out = Vec::new();
    {
        // the trailer is written on drop
        let mut encoder = GifEncoder::new(&mut out);
        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .expect("gif encoding");
    }
    out
}

/// Rewrites the IHDR dimensions of an encoded PNG and fixes up the chunk CRC.
pub fn forge_png_dimensions(png: &mut [u8], width: u32, height: u32) {
    assert_eq!(&png[12..16], b"IHDR");
    png[16..20].copy_from_slice(&width.to_be_bytes());
    png[20..24].copy_from_slice(&height.to_be_bytes());
    let crc = crc32(&png[12..29]);
    png[29..33].copy_from_slice(&crc.to_be_bytes());
}

/// CRC-32/ISO-HDLC, bitwise
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

/// Counts the bytes pulled from the inner reader.
pub struct CountingReader<R> {
    inner: R,
    pub count: u64,
}

impl<R: Read> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, count: 0 }
    }
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

/// Yields `data`, then fails with `kind`.
pub struct FailingReader {
    data: io::Cursor<Vec<u8>>,
    kind: io::ErrorKind,
}

impl FailingReader {
    pub fn new(data: Vec<u8>, kind: io::ErrorKind) -> Self {
        Self {
            data: io::Cursor::new(data),
            kind,
        }
    }
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.data.read(buf)? {
            0 => Err(io::Error::new(self.kind, "stream failed")),
            n => Ok(n),
        }
    }
}
