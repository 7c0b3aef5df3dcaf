/// Raw markup editor
///
/// iced's `Content::text()` always ends the text with a newline and turns
/// CRLF into LF. The markup handed back here is instead rebuilt from the
/// editor's lines and joined with the line ending the SVG used when the
/// editor opened, so the session (and the saved file) get exactly what is
/// on screen. Mixed line endings collapse to the more common one.

use iced::widget::text_editor::{Action, Content};

pub struct MarkupEditor {
    content: Content,
    line_ending: &'static str,
}

impl MarkupEditor {
    pub fn open(svg: &str) -> Self {
        let crlf = svg.matches("\r\n").count();
        let lf = svg.matches('\n').count() - crlf;

        Self {
            content: Content::with_text(svg),
            line_ending: if crlf > lf { "\r\n" } else { "\n" },
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Apply an editor action; returns the new markup when the text changed
    pub fn perform(&mut self, action: Action) -> Option<String> {
        let is_edit = action.is_edit();
        self.content.perform(action);
        is_edit.then(|| self.text())
    }

    pub fn text(&self) -> String {
        let mut text = String::new();
        for (i, line) in self.content.lines().enumerate() {
            if i > 0 {
                text.push_str(self.line_ending);
            }
            text.push_str(&line);
        }
        text
    }
}
