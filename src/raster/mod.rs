/// Raster input module
///
/// This module handles:
/// - Reading and validating the uploaded PNG/JPEG (loader.rs)
/// - Data URL encoding of the normalized raster (data_url.rs)

pub mod data_url;
pub mod loader;

pub use loader::{load_image, LoadError, RasterSource};
