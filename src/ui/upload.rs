/// Upload drop zone and the converting placeholder
use iced::widget::{button, column, container, mouse_area, text};
use iced::{Alignment, Element, Length};

use crate::Message;

/// Height of the drop zone and the converting card
const CARD_HEIGHT: f32 = 256.0;

/// Drop zone shown while no result exists
///
/// The whole card opens the picker on click; file drops are delivered
/// through the window event subscription.
pub fn drop_zone(drag_active: bool, loading: bool) -> Element<'static, Message> {
    let headline = if drag_active {
        "Drop the image here"
    } else {
        "Drag & drop an image here"
    };

    let mut content = column![
        text(headline).size(20),
        text("or click to select a file").size(14),
        button("Upload Image")
            .on_press(Message::OpenFile)
            .padding(10),
    ]
    .spacing(12)
    .align_x(Alignment::Center);

    if loading {
        content = content.push(text("Reading image...").size(14));
    }

    mouse_area(
        container(content)
            .width(Length::Fill)
            .height(Length::Fixed(CARD_HEIGHT))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(CARD_HEIGHT))
            .style(container::bordered_box),
    )
    .on_press(Message::OpenFile)
    .into()
}

/// Placeholder card while a trace is running
pub fn converting() -> Element<'static, Message> {
    container(text("Converting image to SVG...").size(18))
        .width(Length::Fill)
        .padding(32)
        .center_x(Length::Fill)
        .style(container::rounded_box)
        .into()
}
