use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::engine::Kind;
use crate::tui::theme;

/// Key hints, or the latest toast while one is live.
pub fn render(frame: &mut Frame, area: Rect, toast: Option<(&str, Kind)>) {
    let line = match toast {
        Some((message, kind)) => {
            let style = match kind {
                Kind::Success => theme::green(),
                Kind::Error => theme::red(),
                Kind::Info => theme::saffron(),
            };
            Line::from(Span::styled(message.to_string(), style))
        }
        None => {
            let hints = [
                ("[Space]", " count  "),
                ("[p]", " play  "),
                ("[a]", " auto  "),
                ("[ [ ] ]", " speed  "),
                ("[g]", " goal  "),
                ("[s]", " stats  "),
                ("[r]", " reset  "),
                ("[?]", " help  "),
                ("[Esc]", " quit"),
            ];
            let mut spans = Vec::new();
            for (key, label) in &hints {
                spans.push(Span::styled(*key, theme::gold()));
                spans.push(Span::styled(*label, theme::dim()));
            }
            Line::from(spans)
        }
    };

    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
