use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};

use crate::error::PaintError;

/// File name offered when the user downloads their artwork.
pub const DEFAULT_DOWNLOAD_NAME: &str = "my_rocky_art.png";

/// Encode an image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PaintError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(buf)
}

/// Encode and write an image as PNG. A directory path receives
/// [`DEFAULT_DOWNLOAD_NAME`] inside it.
pub fn write_png(image: &RgbaImage, path: &Path) -> Result<std::path::PathBuf, PaintError> {
    let target = if path.is_dir() {
        path.join(DEFAULT_DOWNLOAD_NAME)
    } else {
        path.to_path_buf()
    };
    if let Some(parent) = target.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(&target)?;
    let mut writer = BufWriter::new(file);
    PngEncoder::new(&mut writer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    writer.flush()?;
    Ok(target)
}

/// Load any supported raster file as RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, PaintError> {
    Ok(image::open(path)?.to_rgba8())
}
