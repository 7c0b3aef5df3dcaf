/// Tracing parameters handed to the vectorizer
///
/// Every knob is pinned to a high-fidelity value except the one
/// bound to the slider. The slider can be presented either as a raw
/// blur radius or as an abstract 0-100 "smoothness" value.

use serde::{Deserialize, Serialize};

/// All tuning parameters for one trace
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TracingParams {
    // ========== Path fitting ==========

    /// Error threshold for straight line segments (lower = more detail)
    pub line_threshold: f32,

    /// Error threshold for curve segments (lower = more detail)
    pub quad_threshold: f32,

    /// Paths smaller than this many pixels are dropped
    pub path_omit: u32,

    // ========== Preprocessing ==========

    /// Gaussian blur radius applied before tracing (0.0 to 5.0)
    /// - 0.0 = no blur
    /// - Higher values smooth out noise and gradients
    pub blur_radius: f32,

    // ========== Output ==========

    /// Palette size used for color quantization
    pub colors: u32,

    /// Outline width of emitted shapes (0.0 = filled shapes only)
    pub stroke_width: f32,

    /// Remove one pixel wide noise lines
    pub line_filter: bool,
}

impl Default for TracingParams {
    fn default() -> Self {
        Self {
            line_threshold: 0.01,
            quad_threshold: 0.01,
            path_omit: 1,
            blur_radius: SliderKnob::BlurRadius.default_value(),
            colors: 256,
            stroke_width: 0.0,
            line_filter: true,
        }
    }
}

impl TracingParams {
    /// Parameters with the slider-bound field derived from `value`
    pub fn for_knob(knob: SliderKnob, value: f32) -> Self {
        Self {
            blur_radius: knob.blur_radius(value),
            ..Self::default()
        }
    }

    /// Convert to JSON (used for debug logging of each trace)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Which abstraction the single slider exposes
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SliderKnob {
    /// Raw blur radius, 0.0 to 5.0 in steps of 0.1
    #[default]
    BlurRadius,
    /// Abstract smoothness, 0 to 100, mapped linearly onto the blur radius
    Smoothness,
}

impl SliderKnob {
    pub fn label(&self) -> &'static str {
        match self {
            SliderKnob::BlurRadius => "Blur Radius",
            SliderKnob::Smoothness => "Smoothness",
        }
    }

    pub fn range(&self) -> std::ops::RangeInclusive<f32> {
        match self {
            SliderKnob::BlurRadius => 0.0..=5.0,
            SliderKnob::Smoothness => 0.0..=100.0,
        }
    }

    pub fn step(&self) -> f32 {
        match self {
            SliderKnob::BlurRadius => 0.1,
            SliderKnob::Smoothness => 1.0,
        }
    }

    pub fn default_value(&self) -> f32 {
        match self {
            SliderKnob::BlurRadius => 1.0,
            SliderKnob::Smoothness => 50.0,
        }
    }

    /// Clamp a raw slider value into this knob's range
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default_value();
        }
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }

    /// Map a slider value onto the blur radius the tracer receives
    pub fn blur_radius(&self, value: f32) -> f32 {
        let value = self.clamp(value);
        match self {
            SliderKnob::BlurRadius => value,
            SliderKnob::Smoothness => value / 20.0,
        }
    }

    /// Text shown above the slider, e.g. "Blur Radius: 1.0"
    pub fn display(&self, value: f32) -> String {
        match self {
            SliderKnob::BlurRadius => format!("{}: {:.1}", self.label(), value),
            SliderKnob::Smoothness => format!("{}: {:.0}", self.label(), value),
        }
    }
}
