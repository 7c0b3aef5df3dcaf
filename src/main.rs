use iced::widget::{column, container, svg, text, text_editor, Column};
use iced::{event, task, window, Alignment, Element, Event, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod config;
mod export;
mod raster;
mod state;
mod trace;
mod ui;

use config::Settings;
use export::ExportError;
use raster::loader::ACCEPTED_EXTENSIONS;
use raster::{LoadError, RasterSource};
use state::debounce::Ticket;
use state::pipeline::{Pipeline, Settled};
use state::session::UiMode;
use trace::{TraceOutcome, TraceRequest, Tracer, VtracerTracer};
use ui::editor::MarkupEditor;

const TITLE: &str = "PNG to SVG Converter";

/// Main application state
struct SvgConverter {
    settings: Settings,
    /// The current upload, its result and the slider debouncer
    pipeline: Pipeline,
    /// Pending debounce timer; aborted whenever a newer input arrives
    debounce_timer: Option<task::Handle>,
    tracer: Arc<dyn Tracer>,
    /// Rendered form of the session's SVG, rebuilt when the markup changes
    preview: Option<svg::Handle>,
    /// Raw markup editor, present only in edit mode
    editor: Option<MarkupEditor>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the upload zone or button
    OpenFile,
    /// A file is being dragged over the window
    FileHovered,
    /// The drag left the window without dropping
    FilesHoveredLeft,
    /// A file was dropped onto the window
    FileDropped(PathBuf),
    /// Background decode finished for the given upload ticket
    ImageLoaded(u64, Result<RasterSource, LoadError>),
    /// Background trace finished
    TraceFinished(TraceOutcome),
    /// Slider moved
    SliderChanged(f32),
    /// Debounce timer for the given ticket fired
    DebounceElapsed(Ticket),
    /// "Edit SVG Code" / "Hide SVG Code"
    ToggleEdit,
    /// Keystroke, selection or scroll inside the markup editor
    EditorAction(text_editor::Action),
    /// User clicked "Download SVG"
    Download,
    /// Background save finished
    Saved(Result<PathBuf, ExportError>),
    DismissError,
}

impl SvgConverter {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let settings = Settings::load_or_default(Settings::default_path().as_deref());
        (Self::with_parts(settings, Arc::new(VtracerTracer)), Task::none())
    }

    fn with_parts(settings: Settings, tracer: Arc<dyn Tracer>) -> Self {
        log::info!(
            "🎨 SVG Converter ready (tracer: {}, slider: {}, debounce: {} ms)",
            tracer.name(),
            settings.slider.label(),
            settings.debounce_ms
        );

        SvgConverter {
            pipeline: Pipeline::new(settings.slider, settings.debounce_window()),
            debounce_timer: None,
            tracer,
            preview: None,
            editor: None,
            settings,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFile => {
                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select a PNG or JPEG image")
                    .add_filter("Images", &ACCEPTED_EXTENSIONS)
                    .pick_file();

                match file {
                    Some(path) => {
                        let ticket = self.pipeline.upload(&path);
                        self.load(ticket, path)
                    }
                    None => Task::none(),
                }
            }
            Message::FileHovered => {
                self.pipeline.file_hovered();
                Task::none()
            }
            Message::FilesHoveredLeft => {
                self.pipeline.hover_left();
                Task::none()
            }
            Message::FileDropped(path) => match self.pipeline.file_dropped(&path) {
                Some(ticket) => self.load(ticket, path),
                None => Task::none(),
            },
            Message::ImageLoaded(ticket, result) => {
                let request = self.pipeline.image_loaded(ticket, result);
                self.dispatch(request)
            }
            Message::TraceFinished(outcome) => {
                let request = self.pipeline.trace_finished(outcome);
                self.sync_result();
                self.dispatch(request)
            }
            Message::SliderChanged(value) => {
                let (ticket, delay) = self.pipeline.slider_changed(value);
                self.schedule_debounce(ticket, delay)
            }
            Message::DebounceElapsed(ticket) => {
                self.debounce_timer = None;
                match self.pipeline.debounce_elapsed(ticket) {
                    Settled::Commit(request) => self.dispatch(request),
                    Settled::Reschedule(rest) => self.schedule_debounce(ticket, rest),
                    Settled::Ignore => Task::none(),
                }
            }
            Message::ToggleEdit => {
                let session = self.pipeline.session_mut();
                session.toggle_edit();
                self.editor = if session.is_editing() {
                    session.svg().map(MarkupEditor::open)
                } else {
                    None
                };
                Task::none()
            }
            Message::EditorAction(action) => {
                if let Some(editor) = self.editor.as_mut() {
                    if let Some(markup) = editor.perform(action) {
                        self.pipeline.session_mut().edit_svg(markup);
                        self.refresh_preview();
                    }
                }
                Task::none()
            }
            Message::Download => {
                let Some(svg) = self.pipeline.session().svg().map(str::to_owned) else {
                    return Task::none();
                };

                // Show the native save dialog
                let target = FileDialog::new()
                    .set_title("Save SVG")
                    .set_file_name(&self.settings.download_name)
                    .add_filter("SVG image", &[export::SVG_EXTENSION])
                    .save_file();

                match target {
                    Some(path) => Task::perform(export::save_svg(path, svg), Message::Saved),
                    None => Task::none(),
                }
            }
            Message::Saved(result) => {
                match result {
                    Ok(path) => self
                        .pipeline
                        .set_status(format!("✅ Saved {}", path.display())),
                    Err(e) => {
                        log::error!("❌ {}", e);
                        self.pipeline.set_status(e.to_string());
                    }
                }
                Task::none()
            }
            Message::DismissError => {
                self.pipeline.session_mut().clear_error();
                Task::none()
            }
        }
    }

    /// Drop the old result and decode `path` in the background
    fn load(&mut self, ticket: u64, path: PathBuf) -> Task<Message> {
        self.cancel_debounce();
        self.preview = None;
        self.editor = None;

        Task::perform(raster::load_image(path), move |result| {
            Message::ImageLoaded(ticket, result)
        })
    }

    /// Launch a trace request, if there is one
    fn dispatch(&self, request: Option<TraceRequest>) -> Task<Message> {
        match request {
            Some(request) => Task::perform(
                trace::invoke(self.tracer.clone(), request),
                Message::TraceFinished,
            ),
            None => Task::none(),
        }
    }

    /// Replace any pending debounce timer with a fresh one
    fn schedule_debounce(&mut self, ticket: Ticket, delay: Duration) -> Task<Message> {
        self.cancel_debounce();

        let (timer, handle) = Task::perform(tokio::time::sleep(delay), move |_| {
            Message::DebounceElapsed(ticket)
        })
        .abortable();

        self.debounce_timer = Some(handle);
        timer
    }

    fn cancel_debounce(&mut self) {
        if let Some(handle) = self.debounce_timer.take() {
            handle.abort();
        }
    }

    /// Bring the preview and the open editor in line with the session's SVG
    fn sync_result(&mut self) {
        self.refresh_preview();
        let session = self.pipeline.session();
        if session.is_editing() {
            self.editor = session.svg().map(MarkupEditor::open);
        }
    }

    fn refresh_preview(&mut self) {
        self.preview = self
            .pipeline
            .session()
            .svg()
            .map(|svg| svg::Handle::from_memory(svg.as_bytes().to_vec()));
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let mut content: Column<Message> = column![text(TITLE).size(32)]
            .spacing(20)
            .padding(32)
            .max_width(768.0)
            .align_x(Alignment::Center);

        let session = self.pipeline.session();
        if let Some(error) = session.error() {
            content = content.push(ui::error_banner(error));
        }

        let mode = session.mode();
        if mode == UiMode::Idle {
            content = content.push(ui::upload::drop_zone(
                self.pipeline.drag_active(),
                session.is_loading(),
            ));
        }
        if mode == UiMode::Converting {
            content = content.push(ui::upload::converting());
        }
        // a re-trace keeps the previous result on screen so the slider stays usable
        if let Some(preview) = &self.preview {
            let card = ui::result::ResultCard {
                preview,
                knob: session.knob(),
                slider_value: session.slider_value(),
                editor: self.editor.as_ref().map(MarkupEditor::content),
            };
            content = content.push(card.view());
        }

        content = content.push(text(self.pipeline.status()).size(14));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Window file drag-and-drop
    fn subscription(&self) -> Subscription<Message> {
        event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
            Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Light
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    iced::application(TITLE, SvgConverter::update, SvgConverter::view)
        .subscription(SvgConverter::subscription)
        .theme(SvgConverter::theme)
        .centered()
        .run_with(SvgConverter::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::tests::FakeTracer;
    use iced::widget::text_editor::{Action, Edit, Motion};
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use std::time::Instant;

    fn app() -> SvgConverter {
        SvgConverter::with_parts(Settings::default(), Arc::new(FakeTracer::default()))
    }

    /// App showing `svg` as the traced result of `a.png`
    fn showing(svg: &str) -> SvgConverter {
        let mut app = app();
        let ticket = app.pipeline.upload(Path::new("a.png"));
        let source = RasterSource {
            data_url: "data:image/png;base64,AAAA".to_string(),
            width: 8,
            height: 8,
            file_name: "a.png".to_string(),
        };
        let request = app.pipeline.image_loaded(ticket, Ok(source)).unwrap();

        let _ = app.update(Message::TraceFinished(TraceOutcome {
            generation: request.generation,
            result: Ok(svg.to_string()),
        }));
        app
    }

    #[tokio::test]
    async fn test_trace_result_reaches_preview() {
        let app = showing("<svg/>");
        assert!(app.preview.is_some());
        assert_eq!(app.pipeline.session().mode(), UiMode::Viewing);
        assert_eq!(app.pipeline.status(), "Converted a.png.");
    }

    #[tokio::test]
    async fn test_editor_keystrokes_update_result_verbatim() {
        let mut app = showing("<svg><rect/></svg>");

        let _ = app.update(Message::ToggleEdit);
        assert!(app.editor.is_some());

        let _ = app.update(Message::EditorAction(Action::Move(Motion::DocumentEnd)));
        assert_eq!(app.pipeline.session().svg(), Some("<svg><rect/></svg>"));

        let _ = app.update(Message::EditorAction(Action::Edit(Edit::Insert('x'))));
        assert_eq!(app.pipeline.session().svg(), Some("<svg><rect/></svg>x"));

        // closing the editor keeps the edit
        let _ = app.update(Message::ToggleEdit);
        assert!(app.editor.is_none());
        assert_eq!(app.pipeline.session().svg(), Some("<svg><rect/></svg>x"));
    }

    #[tokio::test]
    async fn test_slider_input_keeps_a_single_timer() {
        let mut app = showing("<svg/>");

        let _ = app.update(Message::SliderChanged(2.0));
        let _ = app.update(Message::SliderChanged(3.0));
        assert!(app.debounce_timer.is_some());
        assert_eq!(app.pipeline.session().slider_value(), 3.0);
        // nothing is traced until the window closes
        assert_eq!(app.pipeline.session().mode(), UiMode::Viewing);
    }

    #[tokio::test]
    async fn test_slider_burst_traces_once() {
        let tracer = Arc::new(FakeTracer::default());
        let mut app = SvgConverter::with_parts(Settings::default(), tracer.clone());

        let ticket = app.pipeline.upload(Path::new("a.png"));
        let source = RasterSource {
            data_url: "data:image/png;base64,AAAA".to_string(),
            width: 8,
            height: 8,
            file_name: "a.png".to_string(),
        };
        let first = app.pipeline.image_loaded(ticket, Ok(source)).unwrap();
        let outcome = trace::invoke(app.tracer.clone(), first).await;
        let _ = app.update(Message::TraceFinished(outcome));

        let t0 = Instant::now();
        let tickets: Vec<Ticket> = [1.5, 2.5, 3.5]
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                let at = t0 + Duration::from_millis(50 * i as u64);
                app.pipeline.slider_changed_at(v, at).0
            })
            .collect();

        let quiet = t0 + Duration::from_millis(100) + app.settings.debounce_window();
        let requests: Vec<TraceRequest> = tickets
            .into_iter()
            .filter_map(|t| match app.pipeline.debounce_elapsed_at(t, quiet) {
                Settled::Commit(request) => request,
                _ => None,
            })
            .collect();
        assert_eq!(requests.len(), 1);

        for request in requests {
            let outcome = trace::invoke(app.tracer.clone(), request).await;
            let _ = app.update(Message::TraceFinished(outcome));
        }

        assert_eq!(tracer.calls.load(Ordering::SeqCst), 2);
        assert!(app.pipeline.session().svg().unwrap().contains("data-blur=\"3.5\""));
        assert!(app.preview.is_some());
    }

    #[tokio::test]
    async fn test_drop_cancels_pending_timer() {
        let mut app = showing("<svg/>");
        let _ = app.update(Message::SliderChanged(2.0));

        let _ = app.update(Message::FileHovered);
        let _ = app.update(Message::FileDropped(PathBuf::from("b.png")));

        assert!(app.debounce_timer.is_none());
        assert!(app.preview.is_none());
        assert!(app.pipeline.session().is_loading());
        assert_eq!(app.pipeline.status(), "Reading image...");
    }

    #[tokio::test]
    async fn test_multi_file_drop_keeps_result() {
        let mut app = showing("<svg/>");

        let _ = app.update(Message::FileHovered);
        let _ = app.update(Message::FileHovered);
        let _ = app.update(Message::FileDropped(PathBuf::from("a.png")));
        let _ = app.update(Message::FileDropped(PathBuf::from("b.png")));

        assert!(app.preview.is_some());
        assert!(!app.pipeline.session().is_loading());
        assert_eq!(
            app.pipeline.session().error(),
            Some(state::pipeline::SINGLE_FILE_ONLY)
        );

        let _ = app.update(Message::DismissError);
        assert_eq!(app.pipeline.session().error(), None);
    }
}
