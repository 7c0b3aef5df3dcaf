/// SVG download
///
/// Writes the current SVG text to disk exactly as it is held in the
/// session. No re-encoding, no pretty-printing, no validation.

use std::path::PathBuf;

pub const DOWNLOAD_FILE_NAME: &str = "converted-image.svg";
pub const SVG_MIME_TYPE: &str = "image/svg+xml";
pub const SVG_EXTENSION: &str = "svg";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("Could not write {path}: {reason}")]
    Write { path: PathBuf, reason: String },
}

/// Save `svg` to `path`, adding a `.svg` extension if none was given
///
/// Returns the path actually written.
pub async fn save_svg(path: PathBuf, svg: String) -> Result<PathBuf, ExportError> {
    let path = with_svg_extension(path);

    tokio::fs::write(&path, svg.as_bytes())
        .await
        .map_err(|e| ExportError::Write {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    log::info!(
        "💾 Saved {} ({} bytes, {})",
        path.display(),
        svg.len(),
        SVG_MIME_TYPE
    );
    Ok(path)
}

fn with_svg_extension(mut path: PathBuf) -> PathBuf {
    if path.extension().is_none() {
        path.set_extension(SVG_EXTENSION);
    }
    path
}
