/// Result card: preview, slider, raw markup editor and actions
use iced::widget::{button, column, container, row, scrollable, slider, svg, text, text_editor};
use iced::{Alignment, Element, Font, Length};

use crate::state::params::SliderKnob;
use crate::Message;

const PREVIEW_HEIGHT: f32 = 360.0;
const EDITOR_HEIGHT: f32 = 256.0;

/// Everything the result card needs from the application state
pub struct ResultCard<'a> {
    pub preview: &'a svg::Handle,
    pub knob: SliderKnob,
    pub slider_value: f32,
    /// Present while the raw markup editor is open
    pub editor: Option<&'a text_editor::Content>,
}

impl<'a> ResultCard<'a> {
    pub fn view(self) -> Element<'a, Message> {
        let preview = container(
            svg(self.preview.clone())
                .width(Length::Fill)
                .height(Length::Fixed(PREVIEW_HEIGHT)),
        )
        .padding(16)
        .style(container::bordered_box);

        let knob = self.knob;
        let tuning = column![
            text(knob.display(self.slider_value)).size(14),
            slider(knob.range(), self.slider_value, Message::SliderChanged).step(knob.step()),
        ]
        .spacing(8);

        let toggle_label = if self.editor.is_some() {
            "Hide SVG Code"
        } else {
            "Edit SVG Code"
        };
        let actions = row![
            button("Download SVG")
                .on_press(Message::Download)
                .padding(10),
            button(toggle_label)
                .on_press(Message::ToggleEdit)
                .padding(10)
                .style(button::secondary),
        ]
        .spacing(16);

        let mut content = column![preview, tuning].spacing(24);

        if let Some(editor) = self.editor {
            content = content.push(
                text_editor(editor)
                    .on_action(Message::EditorAction)
                    .font(Font::MONOSPACE)
                    .height(Length::Fixed(EDITOR_HEIGHT)),
            );
        }

        content = content.push(actions);

        scrollable(content.align_x(Alignment::Center).padding(8)).into()
    }
}
