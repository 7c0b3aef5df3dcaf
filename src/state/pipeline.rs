/// Conversion pipeline
///
/// The state transitions behind the window's update loop: uploads, decode
/// and trace completions, debounced slider commits and drag-and-drop
/// bookkeeping. Nothing here touches dialogs, timers or widgets; every
/// method reports what the caller should start next (a decode, a trace, a
/// timer), and the caller turns that into background tasks.

use std::path::Path;
use std::time::{Duration, Instant};

use super::debounce::{Debouncer, Ticket};
use super::params::SliderKnob;
use super::session::{Session, UiMode};
use crate::raster::{LoadError, RasterSource};
use crate::trace::{TraceOutcome, TraceRequest};

/// Shown when a drop gesture carries more than one file
pub const SINGLE_FILE_ONLY: &str = "Drop a single PNG or JPEG image.";

/// What to do when a debounce timer fires
#[derive(Debug)]
pub enum Settled {
    /// The value was committed; carries the re-trace if one can start now
    Commit(Option<TraceRequest>),
    /// The timer fired before the window closed; sleep this much longer
    Reschedule(Duration),
    /// Superseded or cancelled ticket
    Ignore,
}

#[derive(Debug)]
pub struct Pipeline {
    session: Session,
    /// Coalesces slider input into committed values
    debouncer: Debouncer<f32>,
    /// Files announced by the current drag gesture
    hovered_files: usize,
    /// The current drop gesture carries several files and is being discarded
    rejecting_drop: bool,
    status: String,
}

impl Pipeline {
    pub fn new(knob: SliderKnob, debounce_window: Duration) -> Self {
        Self {
            session: Session::new(knob),
            debouncer: Debouncer::new(debounce_window),
            hovered_files: 0,
            rejecting_drop: false,
            status: String::from("Ready."),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    /// A file is hovering over the window
    pub fn drag_active(&self) -> bool {
        self.hovered_files > 0
    }

    // ========== Upload ==========

    /// Start a new upload of `path`; returns the ticket its decode must carry
    ///
    /// Any pending slider value dies with the old session.
    pub fn upload(&mut self, path: &Path) -> u64 {
        if self.session.is_loading() {
            log::info!("📂 Replacing pending upload with {}", path.display());
        } else {
            log::info!("📂 New upload: {}", path.display());
        }

        self.debouncer.cancel();
        let ticket = self.session.begin_upload();
        self.status = String::from("Reading image...");
        ticket
    }

    /// Apply a finished decode; returns the first trace on success
    pub fn image_loaded(
        &mut self,
        ticket: u64,
        result: Result<RasterSource, LoadError>,
    ) -> Option<TraceRequest> {
        if !self.session.awaits_upload(ticket) {
            return self.session.finish_upload(ticket, result);
        }

        self.status = match &result {
            Ok(source) => format!(
                "Converting {} ({}x{})...",
                source.file_name, source.width, source.height
            ),
            Err(_) => String::from("Could not load the image."),
        };
        self.session.finish_upload(ticket, result)
    }

    /// Apply a finished trace; returns the queued follow-up, if any
    pub fn trace_finished(&mut self, outcome: TraceOutcome) -> Option<TraceRequest> {
        let failed = outcome.result.is_err();
        let request = self.session.complete_trace(outcome);

        if request.is_none() && self.session.mode() != UiMode::Converting {
            if failed && self.session.error().is_some() {
                self.status = String::from("Conversion failed.");
            } else if let Some(source) = self.session.source() {
                self.status = format!("Converted {}.", source.file_name);
            }
        }
        request
    }

    // ========== Slider ==========

    /// Record a slider movement; returns the ticket and delay for the timer
    pub fn slider_changed(&mut self, value: f32) -> (Ticket, Duration) {
        self.slider_changed_at(value, Instant::now())
    }

    pub fn slider_changed_at(&mut self, value: f32, now: Instant) -> (Ticket, Duration) {
        self.session.set_slider(value);
        let ticket = self.debouncer.push_at(self.session.slider_value(), now);
        (ticket, self.debouncer.window())
    }

    /// Handle a fired debounce timer
    pub fn debounce_elapsed(&mut self, ticket: Ticket) -> Settled {
        self.debounce_elapsed_at(ticket, Instant::now())
    }

    pub fn debounce_elapsed_at(&mut self, ticket: Ticket, now: Instant) -> Settled {
        match self.debouncer.settle_at(ticket, now) {
            Some(value) => Settled::Commit(self.session.commit_slider(value)),
            // fired a hair early; wait out the rest of the window
            None if self.debouncer.is_current(ticket) && self.debouncer.has_pending() => {
                Settled::Reschedule(self.debouncer.remaining_at(now))
            }
            None => Settled::Ignore,
        }
    }

    // ========== Drag and drop ==========

    /// The window announces one hovering file per call
    pub fn file_hovered(&mut self) {
        self.hovered_files += 1;
    }

    pub fn hover_left(&mut self) {
        self.hovered_files = 0;
        self.rejecting_drop = false;
    }

    /// A dropped file; returns the upload ticket when the drop is accepted
    ///
    /// The window delivers one event per file. A gesture that hovered more
    /// than one file is discarded as a whole and the current session is
    /// left untouched. Platforms that never announce hovering files get one
    /// upload per dropped file, and the last one wins.
    pub fn file_dropped(&mut self, path: &Path) -> Option<u64> {
        if self.hovered_files > 1 {
            self.rejecting_drop = true;
        }
        let rejected = self.rejecting_drop;

        self.hovered_files = self.hovered_files.saturating_sub(1);
        if self.hovered_files == 0 {
            self.rejecting_drop = false;
        }

        if rejected {
            log::warn!("⚠️  Ignoring {}: drop one image at a time", path.display());
            self.session.report_error(SINGLE_FILE_ONLY);
            return None;
        }
        Some(self.upload(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::params::TracingParams;
    use crate::trace::TraceError;

    const WINDOW: Duration = Duration::from_millis(300);

    fn source(name: &str) -> RasterSource {
        RasterSource {
            data_url: "data:image/png;base64,AAAA".to_string(),
            width: 64,
            height: 64,
            file_name: name.to_string(),
        }
    }

    fn done(request: &TraceRequest, svg: &str) -> TraceOutcome {
        TraceOutcome {
            generation: request.generation,
            result: Ok(svg.to_string()),
        }
    }

    /// Pipeline showing the first trace of `a.png`
    fn viewing() -> Pipeline {
        let mut pipeline = Pipeline::new(SliderKnob::BlurRadius, WINDOW);
        let ticket = pipeline.upload(Path::new("a.png"));
        let first = pipeline.image_loaded(ticket, Ok(source("a.png"))).unwrap();
        assert!(pipeline.trace_finished(done(&first, "<svg>first</svg>")).is_none());
        pipeline
    }

    #[test]
    fn test_slider_burst_commits_once() {
        let mut pipeline = viewing();
        let t0 = Instant::now();

        let mut tickets = Vec::new();
        for (i, value) in [1.5, 2.0, 2.5, 3.0, 3.5].into_iter().enumerate() {
            let at = t0 + Duration::from_millis(40 * i as u64);
            let (ticket, delay) = pipeline.slider_changed_at(value, at);
            assert_eq!(delay, WINDOW);
            tickets.push(ticket);
        }
        assert_eq!(pipeline.session().slider_value(), 3.5);
        let last_input = t0 + Duration::from_millis(160);

        // timers of superseded inputs do nothing, even after the window
        for &stale in &tickets[..4] {
            let at = last_input + WINDOW;
            assert!(matches!(pipeline.debounce_elapsed_at(stale, at), Settled::Ignore));
        }
        assert_eq!(pipeline.session().mode(), UiMode::Viewing);

        let latest = tickets[4];
        let request = match pipeline.debounce_elapsed_at(latest, last_input + WINDOW) {
            Settled::Commit(Some(request)) => request,
            other => panic!("expected a trace, got {:?}", other),
        };
        assert_eq!(request.params.blur_radius, 3.5);
        assert_eq!(pipeline.session().mode(), UiMode::Converting);

        // the same timer firing twice cannot trace again
        assert!(matches!(
            pipeline.debounce_elapsed_at(latest, last_input + WINDOW * 2),
            Settled::Ignore
        ));
    }

    #[test]
    fn test_early_timer_reschedules_remaining_window() {
        let mut pipeline = viewing();
        let t0 = Instant::now();
        let (ticket, _) = pipeline.slider_changed_at(4.0, t0);

        let early = t0 + Duration::from_millis(290);
        match pipeline.debounce_elapsed_at(ticket, early) {
            Settled::Reschedule(rest) => assert_eq!(rest, Duration::from_millis(10)),
            other => panic!("expected a reschedule, got {:?}", other),
        }

        let request = match pipeline.debounce_elapsed_at(ticket, early + Duration::from_millis(10)) {
            Settled::Commit(Some(request)) => request,
            other => panic!("expected a trace, got {:?}", other),
        };
        assert_eq!(request.params.blur_radius, 4.0);
    }

    #[test]
    fn test_upload_discards_pending_slider_value() {
        let mut pipeline = viewing();
        let t0 = Instant::now();
        let (ticket, _) = pipeline.slider_changed_at(4.0, t0);

        let upload = pipeline.upload(Path::new("b.png"));
        assert!(matches!(
            pipeline.debounce_elapsed_at(ticket, t0 + WINDOW),
            Settled::Ignore
        ));

        let request = pipeline.image_loaded(upload, Ok(source("b.png"))).unwrap();
        assert_eq!(request.params, TracingParams::default());
    }

    #[test]
    fn test_commit_during_trace_dispatches_follow_up() {
        let mut pipeline = viewing();
        let t0 = Instant::now();

        let (ticket, _) = pipeline.slider_changed_at(2.0, t0);
        let running = match pipeline.debounce_elapsed_at(ticket, t0 + WINDOW) {
            Settled::Commit(Some(request)) => request,
            other => panic!("expected a trace, got {:?}", other),
        };

        // two more commits while the trace runs
        let t1 = t0 + WINDOW * 2;
        let (ticket, _) = pipeline.slider_changed_at(3.0, t1);
        assert!(matches!(
            pipeline.debounce_elapsed_at(ticket, t1 + WINDOW),
            Settled::Commit(None)
        ));
        let t2 = t1 + WINDOW * 2;
        let (ticket, _) = pipeline.slider_changed_at(4.5, t2);
        assert!(matches!(
            pipeline.debounce_elapsed_at(ticket, t2 + WINDOW),
            Settled::Commit(None)
        ));

        let follow_up = pipeline.trace_finished(done(&running, "<svg>2</svg>")).unwrap();
        assert_eq!(follow_up.params.blur_radius, 4.5);
        assert!(pipeline.trace_finished(done(&follow_up, "<svg>4.5</svg>")).is_none());
        assert_eq!(pipeline.session().svg(), Some("<svg>4.5</svg>"));
        assert_eq!(pipeline.status(), "Converted a.png.");
    }

    #[test]
    fn test_status_follows_upload() {
        let mut pipeline = Pipeline::new(SliderKnob::BlurRadius, WINDOW);
        assert_eq!(pipeline.status(), "Ready.");

        let ticket = pipeline.upload(Path::new("a.png"));
        assert_eq!(pipeline.status(), "Reading image...");

        pipeline.image_loaded(ticket, Ok(source("a.png"))).unwrap();
        assert_eq!(pipeline.status(), "Converting a.png (64x64)...");
    }

    #[test]
    fn test_failed_decode_updates_status() {
        let mut pipeline = Pipeline::new(SliderKnob::BlurRadius, WINDOW);
        let ticket = pipeline.upload(Path::new("notes.png"));

        let request = pipeline.image_loaded(ticket, Err(LoadError::UnsupportedFormat));
        assert!(request.is_none());
        assert_eq!(pipeline.status(), "Could not load the image.");
        assert!(pipeline.session().error().unwrap().contains("PNG and JPEG"));
    }

    #[test]
    fn test_stale_decode_leaves_status_alone() {
        let mut pipeline = Pipeline::new(SliderKnob::BlurRadius, WINDOW);
        let old = pipeline.upload(Path::new("old.png"));
        let _current = pipeline.upload(Path::new("new.png"));

        assert!(pipeline.image_loaded(old, Err(LoadError::Empty)).is_none());
        assert_eq!(pipeline.status(), "Reading image...");
        assert_eq!(pipeline.session().error(), None);
    }

    #[test]
    fn test_failed_trace_updates_status() {
        let mut pipeline = viewing();
        let (ticket, _) = pipeline.slider_changed_at(2.0, Instant::now());
        let request = match pipeline.debounce_elapsed_at(ticket, Instant::now() + WINDOW) {
            Settled::Commit(Some(request)) => request,
            other => panic!("expected a trace, got {:?}", other),
        };

        pipeline.trace_finished(TraceOutcome {
            generation: request.generation,
            result: Err(TraceError::Backend("boom".to_string())),
        });
        assert_eq!(pipeline.status(), "Conversion failed.");
        assert_eq!(pipeline.session().svg(), Some("<svg>first</svg>"));
    }

    #[test]
    fn test_single_file_drop_uploads() {
        let mut pipeline = Pipeline::new(SliderKnob::BlurRadius, WINDOW);
        pipeline.file_hovered();
        assert!(pipeline.drag_active());

        let ticket = pipeline.file_dropped(Path::new("a.png"));
        assert!(ticket.is_some());
        assert!(!pipeline.drag_active());
        assert!(pipeline.session().is_loading());
    }

    #[test]
    fn test_multi_file_drop_is_rejected_whole() {
        let mut pipeline = viewing();
        pipeline.file_hovered();
        pipeline.file_hovered();

        assert_eq!(pipeline.file_dropped(Path::new("a.png")), None);
        assert_eq!(pipeline.file_dropped(Path::new("b.png")), None);

        // the result on screen survives the rejected drop
        assert_eq!(pipeline.session().svg(), Some("<svg>first</svg>"));
        assert!(!pipeline.session().is_loading());
        assert_eq!(pipeline.session().error(), Some(SINGLE_FILE_ONLY));
        assert!(!pipeline.drag_active());

        // the next single-file gesture is accepted again
        pipeline.file_hovered();
        assert!(pipeline.file_dropped(Path::new("c.png")).is_some());
    }

    #[test]
    fn test_drag_leaving_resets_gesture() {
        let mut pipeline = Pipeline::new(SliderKnob::BlurRadius, WINDOW);
        pipeline.file_hovered();
        pipeline.file_hovered();
        pipeline.hover_left();
        assert!(!pipeline.drag_active());

        pipeline.file_hovered();
        assert!(pipeline.file_dropped(Path::new("a.png")).is_some());
    }

    #[test]
    fn test_drop_without_hover_events_last_file_wins() {
        let mut pipeline = Pipeline::new(SliderKnob::BlurRadius, WINDOW);
        let first = pipeline.file_dropped(Path::new("a.png")).unwrap();
        let second = pipeline.file_dropped(Path::new("b.png")).unwrap();

        assert!(pipeline.image_loaded(first, Ok(source("a.png"))).is_none());
        let request = pipeline.image_loaded(second, Ok(source("b.png"))).unwrap();
        assert_eq!(request.source.file_name, "b.png");
    }
}
