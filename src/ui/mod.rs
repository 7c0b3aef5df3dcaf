/// View building blocks
///
/// - Upload drop zone and converting placeholder (upload.rs)
/// - Result card with preview, slider, editor and actions (result.rs)
/// - Raw markup editor state (editor.rs)

pub mod editor;
pub mod result;
pub mod upload;

use iced::widget::{button, container, row, text};
use iced::{Alignment, Element, Length};

use crate::Message;

/// Dismissable error line shown above the cards
pub fn error_banner(message: &str) -> Element<'_, Message> {
    container(
        row![
            text(message).style(text::danger).width(Length::Fill),
            button("Dismiss")
                .on_press(Message::DismissError)
                .style(button::text),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .padding(12)
    .width(Length::Fill)
    .style(container::bordered_box)
    .into()
}
