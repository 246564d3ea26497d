//! Image output.
//!
//! Writes a finished [`ImageBuffer`] to disk. Channels are written in RGB
//! order, matching the in-memory layout.
//!
//! - `.ppm`: ASCII pixel map (`P3`), one `R G B` line per pixel
//! - `.png`: 8-bit PNG through the `image` crate

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::buffer::{color_to_rgb8, ImageBuffer};
use crate::error::{OutputError, OutputResult};

/// Write an image as an ASCII `P3` pixel map.
pub fn write_ppm<W: Write>(image: &ImageBuffer, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for color in &image.pixels {
        let [r, g, b] = color_to_rgb8(*color);
        writeln!(writer, "{} {} {}", r, g, b)?;
    }

    Ok(())
}

/// Save an image to `path`, choosing the format from the file extension.
pub fn save_image(image: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "ppm" => save_ppm(image, path),
        "png" => save_png(image, path),
        other => Err(OutputError::UnsupportedFormat(format!(
            "'{}' (expected .ppm or .png)",
            other
        ))),
    }?;

    log::info!("Saved {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}

fn save_ppm(image: &ImageBuffer, path: &Path) -> OutputResult<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_ppm(image, &mut writer)?;
    writer.flush()?;
    Ok(())
}

fn save_png(image: &ImageBuffer, path: &Path) -> OutputResult<()> {
    let buffer = image::RgbImage::from_raw(image.width, image.height, image.to_rgb8()).ok_or(
        OutputError::BufferSize {
            width: image.width,
            height: image.height,
        },
    )?;
    buffer.save(path)?;
    Ok(())
}
