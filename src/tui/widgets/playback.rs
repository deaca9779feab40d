use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::engine::Session;
use crate::tui::theme;
use crate::utils::format::format_speed;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    sound_name: Option<&str>,
    volume: f64,
) {
    let block = Block::default()
        .title(Span::styled(" Playback ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let state_line = if session.is_playing {
        Line::from(vec![
            Span::styled("  ▶ Playing", theme::green().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", format_speed(session.playback_speed)),
                theme::saffron(),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("  ⏸ Paused", theme::dim()),
            Span::styled(
                format!("  {}", format_speed(session.playback_speed)),
                theme::dim(),
            ),
        ])
    };

    let auto_line = Line::from(vec![
        Span::styled("  auto-count: ", theme::dim()),
        if session.auto_count_enabled {
            Span::styled("on", theme::green())
        } else {
            Span::styled("off", theme::dim())
        },
    ]);

    let track_line = Line::from(vec![
        Span::styled("  track: ", theme::dim()),
        Span::styled(sound_name.unwrap_or("—"), theme::gold()),
        Span::styled(
            format!("  ·  vol {}%", (volume.clamp(0.0, 1.0) * 100.0).round() as u32),
            theme::dim(),
        ),
    ]);

    let text = vec![Line::from(""), state_line, auto_line, track_line];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
