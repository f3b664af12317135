//! colorbot - print the dominant colors of an image
//!
//! ```text
//! $ colorbot hodges-research.png
//! #000000
//! #af905a
//! #f6d185
//! #f9e2b3
//! #ffffff
//! ```
//!
//! Supports GIF, JPEG and PNG images from a file, stdin (`-`) or an http(s) URL.

use std::fs::File;
use std::io::{self, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
#[cfg(feature = "print-truecolor")]
use termion::color;

use colorbot::{dominant_colors, Decoder, Palette, SizeLimits};

/// Print the N most dominant colors of a GIF, JPEG or PNG image.
#[derive(Parser, Debug)]
#[command(name = "colorbot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Image file, `-` for stdin, or an http(s) URL
    #[arg(value_name = "IMAGE")]
    source: String,

    /// Number of colors to print
    #[arg(short, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    n: u32,

    /// Maximum image size in bytes
    #[arg(long, default_value_t = SizeLimits::default().max_bytes)]
    max_bytes: u64,

    /// Maximum image size in pixels
    #[arg(long, default_value_t = SizeLimits::default().max_pixels)]
    max_pixels: u64,
}

fn open(source: &str) -> Result<Box<dyn Read>> {
    if source == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = ureq::get(source)
            .call()
            .with_context(|| format!("failed to fetch {}", source))?;
        return Ok(Box::new(response.into_reader()));
    }
    let file = File::open(source).with_context(|| format!("failed to open {}", source))?;
    Ok(Box::new(file))
}

fn print_palette(palette: &Palette) {
    for c in palette {
        #[cfg(feature = "print-truecolor")]
        {
            let [r, g, b] = c.color.0;
            println!(
                "{} {}███{}",
                c,
                color::Fg(color::Rgb(r, g, b)),
                color::Fg(color::Reset)
            );
        }
        #[cfg(not(feature = "print-truecolor"))]
        println!("{}", c);
    }
}

fn run(args: &Args) -> Result<Palette> {
    let input = open(&args.source)?;
    let limits = SizeLimits::new(args.max_bytes, args.max_pixels);
    let image = Decoder::default()
        .decode(input, limits)
        .with_context(|| format!("could not decode {}", args.source))?;
    log::info!(
        "decoded {:?} image, {}x{}",
        image.format,
        image.width(),
        image.height()
    );
    Ok(dominant_colors(&image.pixels, args.n as usize))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(palette) => {
            print_palette(&palette);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let rejected = err
                .downcast_ref::<colorbot::Error>()
                .map_or(false, colorbot::Error::is_too_large);
            if rejected {
                eprintln!("input rejected: {:#}", err);
            } else {
                eprintln!("error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
