/// State management module
///
/// This module handles all application state, including:
/// - The conversion session and UI mode (session.rs)
/// - Tracing parameters and the slider knob (params.rs)
/// - Slider input debouncing (debounce.rs)
/// - Update-loop transitions on top of the session (pipeline.rs)

pub mod debounce;
pub mod params;
pub mod pipeline;
pub mod session;
