/// Conversion session
///
/// Owns everything tied to one upload: the normalized raster, the live and
/// committed slider values, the SVG result and the edit flag. Every upload
/// and every trace request gets a fresh generation number; results carrying
/// anything but the current generation are dropped, so a slow trace can
/// never overwrite a newer one.
///
/// Re-trace policy while a trace is running: queue-latest-only. A commit
/// that arrives mid-trace is remembered, and exactly one follow-up trace is
/// issued with the newest committed value once the running one completes.

use std::sync::Arc;

use super::params::{SliderKnob, TracingParams};
use crate::raster::{LoadError, RasterSource};
use crate::trace::{TraceOutcome, TraceRequest};

/// What the window is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    /// Waiting for an upload (also while the upload is being decoded)
    Idle,
    /// A trace is in flight
    Converting,
    /// SVG shown as a rendered preview
    Viewing,
    /// SVG shown with the raw markup editor open
    Editing,
}

#[derive(Debug)]
pub struct Session {
    knob: SliderKnob,
    source: Option<Arc<RasterSource>>,
    /// Live slider value (label follows this immediately)
    slider_value: f32,
    /// Debounced slider value that drives tracing
    committed_value: f32,
    svg: Option<String>,
    editing: bool,
    /// Upload ticket awaiting its decode
    loading: Option<u64>,
    /// Generation of the trace whose result we are waiting for
    in_flight: Option<u64>,
    /// A commit arrived while a trace was running
    retrace_queued: bool,
    generation: u64,
    error: Option<String>,
}

impl Session {
    pub fn new(knob: SliderKnob) -> Self {
        Self {
            knob,
            source: None,
            slider_value: knob.default_value(),
            committed_value: knob.default_value(),
            svg: None,
            editing: false,
            loading: None,
            in_flight: None,
            retrace_queued: false,
            generation: 0,
            error: None,
        }
    }

    // ========== Queries ==========

    pub fn mode(&self) -> UiMode {
        match (&self.svg, self.in_flight, self.editing) {
            (_, Some(_), _) => UiMode::Converting,
            (Some(_), None, true) => UiMode::Editing,
            (Some(_), None, false) => UiMode::Viewing,
            (None, None, _) => UiMode::Idle,
        }
    }

    pub fn knob(&self) -> SliderKnob {
        self.knob
    }

    pub fn slider_value(&self) -> f32 {
        self.slider_value
    }

    /// Parameters the next trace will use
    pub fn params(&self) -> TracingParams {
        TracingParams::for_knob(self.knob, self.committed_value)
    }

    pub fn svg(&self) -> Option<&str> {
        self.svg.as_deref()
    }

    pub fn source(&self) -> Option<&RasterSource> {
        self.source.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether `ticket` is the upload still waiting for its decode
    pub fn awaits_upload(&self, ticket: u64) -> bool {
        self.loading == Some(ticket)
    }

    // ========== Upload ==========

    /// Start a new upload: full reset of everything downstream
    ///
    /// Returns the ticket the decode result must present to `finish_upload`.
    pub fn begin_upload(&mut self) -> u64 {
        let ticket = self.next_generation();
        *self = Self {
            generation: ticket,
            loading: Some(ticket),
            ..Self::new(self.knob)
        };
        ticket
    }

    /// Store the decoded raster and issue the first trace with default parameters
    pub fn finish_upload(
        &mut self,
        ticket: u64,
        result: Result<RasterSource, LoadError>,
    ) -> Option<TraceRequest> {
        if !self.awaits_upload(ticket) {
            log::debug!("Dropping stale upload {} (current: {:?})", ticket, self.loading);
            return None;
        }
        self.loading = None;

        match result {
            Ok(source) => {
                self.source = Some(Arc::new(source));
                self.issue_trace()
            }
            Err(e) => {
                log::error!("❌ Upload failed: {}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }

    // ========== Slider ==========

    /// Record a slider movement (display only, nothing is traced)
    pub fn set_slider(&mut self, value: f32) {
        self.slider_value = self.knob.clamp(value);
    }

    /// Commit a debounced slider value and re-trace if possible
    pub fn commit_slider(&mut self, value: f32) -> Option<TraceRequest> {
        self.committed_value = self.knob.clamp(value);
        log::debug!("Committed {}", self.knob.display(self.committed_value));

        if self.source.is_none() {
            return None;
        }

        if self.in_flight.is_some() {
            log::debug!("Trace in flight, queueing re-trace");
            self.retrace_queued = true;
            return None;
        }

        self.issue_trace()
    }

    // ========== Trace completion ==========

    /// Apply a trace outcome; may return the queued follow-up request
    pub fn complete_trace(&mut self, outcome: TraceOutcome) -> Option<TraceRequest> {
        if self.in_flight != Some(outcome.generation) {
            log::debug!(
                "Dropping stale trace {} (current: {:?})",
                outcome.generation,
                self.in_flight
            );
            return None;
        }
        self.in_flight = None;

        match outcome.result {
            Ok(svg) => {
                self.svg = Some(svg);
                self.error = None;
            }
            Err(e) => {
                self.error = Some(e.to_string());
            }
        }

        if std::mem::take(&mut self.retrace_queued) {
            return self.issue_trace();
        }
        None
    }

    // ========== Editing ==========

    /// Flip between preview and raw markup; no-op without a result
    pub fn toggle_edit(&mut self) {
        if self.svg.is_some() {
            self.editing = !self.editing;
        }
    }

    /// Replace the SVG with user-edited markup (not validated)
    pub fn edit_svg(&mut self, text: String) {
        if self.svg.is_some() {
            self.svg = Some(text);
        }
    }

    /// Surface a problem that does not change the result
    pub fn report_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn issue_trace(&mut self) -> Option<TraceRequest> {
        let source = self.source.clone()?;
        let generation = self.next_generation();
        self.in_flight = Some(generation);

        Some(TraceRequest {
            generation,
            source,
            params: self.params(),
        })
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SliderKnob::default())
    }
}
