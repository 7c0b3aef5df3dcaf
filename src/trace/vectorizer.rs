/// vtracer-backed tracer
///
/// vtracer does the actual work (color clustering, path walking, spline
/// fitting). This file only prepares pixels and maps our parameter record
/// onto its config.

use image::imageops;
use vtracer::{ColorImage, ColorMode, Config, Hierarchical};

use super::{TraceError, Tracer};
use crate::raster::loader::decode_data_url;
use crate::state::params::TracingParams;

/// Shortest path segment vtracer accepts
const MIN_LENGTH_THRESHOLD: f64 = 3.5;
const MAX_LENGTH_THRESHOLD: f64 = 10.0;

#[derive(Debug, Default, Clone, Copy)]
pub struct VtracerTracer;

impl Tracer for VtracerTracer {
    fn name(&self) -> &'static str {
        "vtracer"
    }

    fn trace(&self, data_url: &str, params: &TracingParams) -> Result<String, TraceError> {
        if params.stroke_width > 0.0 {
            return Err(TraceError::Unsupported(format!(
                "stroke width {} (vtracer emits filled shapes only)",
                params.stroke_width
            )));
        }

        let img = decode_data_url(data_url).map_err(|e| TraceError::Input(e.to_string()))?;

        let mut rgba = img.to_rgba8();
        if params.blur_radius > 0.0 {
            rgba = imageops::blur(&rgba, params.blur_radius);
        }

        let (width, height) = rgba.dimensions();
        let color_image = ColorImage {
            pixels: rgba.into_raw(),
            width: width as usize,
            height: height as usize,
        };

        let svg = vtracer::convert(color_image, config_for(params)).map_err(TraceError::Backend)?;
        Ok(svg.to_string())
    }
}

/// Map the parameter record onto vtracer's knobs
fn config_for(params: &TracingParams) -> Config {
    let colors = params.colors.clamp(2, 256);
    let color_precision = (colors as f32).log2().ceil().clamp(1.0, 8.0) as i32;
    let layer_difference = (256 / colors).max(1) as i32;
    let filter_speckle = params
        .path_omit
        .max(if params.line_filter { 2 } else { 0 }) as usize;
    let length_threshold = (MIN_LENGTH_THRESHOLD + params.line_threshold as f64)
        .clamp(MIN_LENGTH_THRESHOLD, MAX_LENGTH_THRESHOLD);
    let corner_threshold = (params.quad_threshold * 60.0).round().clamp(0.0, 180.0) as i32;

    Config {
        color_mode: ColorMode::Color,
        hierarchical: Hierarchical::Stacked,
        filter_speckle,
        color_precision,
        layer_difference,
        corner_threshold,
        length_threshold,
        path_precision: Some(2),
        ..Config::default()
    }
}
