/// Image loader
///
/// Reads one user-supplied PNG/JPEG, decodes it at its natural size and
/// re-encodes it as a lossless PNG data URL. That data URL is the
/// repeatable input for every trace of the current upload.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tokio::task;

use super::data_url;

/// MIME types accepted from the user
pub const ACCEPTED_MIME_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

/// File extensions offered in the picker dialog
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Could not read {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Unsupported file type (only PNG and JPEG images are accepted)")]
    UnsupportedFormat,

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Image has no pixels")]
    Empty,

    #[error("Could not re-encode image: {0}")]
    Encode(String),

    #[error("Background task failed: {0}")]
    Worker(String),
}

/// A decoded upload, normalized to a PNG data URL
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSource {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    /// Filename only (e.g., "logo.png"), for status messages
    pub file_name: String,
}

/// Load an image file into a `RasterSource`
///
/// Decoding and PNG encoding are CPU-bound, so the whole load runs on
/// the blocking pool.
pub async fn load_image(path: PathBuf) -> Result<RasterSource, LoadError> {
    task::spawn_blocking(move || load_image_blocking(&path))
        .await
        .map_err(|e| LoadError::Worker(e.to_string()))?
}

fn load_image_blocking(path: &Path) -> Result<RasterSource, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|e| LoadError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let file_name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let source = decode_to_source(&bytes, file_name)?;

    log::info!(
        "🖼️  Loaded {} ({}x{}, {} KB)",
        source.file_name,
        source.width,
        source.height,
        bytes.len() / 1024
    );

    Ok(source)
}

/// Decode PNG/JPEG bytes and normalize them to a PNG data URL
pub fn decode_to_source(bytes: &[u8], file_name: String) -> Result<RasterSource, LoadError> {
    let format = sniff_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| LoadError::Decode(e.to_string()))?;

    if img.width() == 0 || img.height() == 0 {
        return Err(LoadError::Empty);
    }

    let png = encode_png(&img)?;

    Ok(RasterSource {
        data_url: data_url::encode("image/png", &png),
        width: img.width(),
        height: img.height(),
        file_name,
    })
}

/// Identify the container from its magic bytes; the extension is not trusted
fn sniff_format(bytes: &[u8]) -> Result<ImageFormat, LoadError> {
    match image::guess_format(bytes) {
        Ok(format) if ACCEPTED_MIME_TYPES.contains(&format.to_mime_type()) => Ok(format),
        Ok(_) => Err(LoadError::UnsupportedFormat),
        Err(e) => Err(LoadError::Decode(e.to_string())),
    }
}

/// Draw the image unscaled into an RGBA buffer and export it losslessly
fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, LoadError> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let mut png = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| LoadError::Encode(e.to_string()))?;
    Ok(png)
}

/// Decode a data URL produced by this module back into pixels
pub fn decode_data_url(data_url: &str) -> Result<DynamicImage, LoadError> {
    let bytes = data_url::decode(data_url).map_err(|e| LoadError::Decode(e.to_string()))?;
    image::load_from_memory(&bytes).map_err(|e| LoadError::Decode(e.to_string()))
}
