use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{date_str, Stats};
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, stats: &Stats, best: u32, today: NaiveDate) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(theme::BORDER))
        .style(theme::surface());

    // One dot per day, oldest first
    let goal = u64::from(stats.goal_malas);
    let mut dot_spans = vec![Span::styled("  ", theme::dim())];
    for offset in (0..7).rev() {
        let date = date_str(today - chrono::Duration::days(offset));
        let record = stats.day_record(&date);
        let malas = record.map(|r| r.malas).unwrap_or(0);
        let mantras = record.map(|r| r.mantras).unwrap_or(0);
        let (dot, style) = if malas >= goal {
            ("●", theme::green().add_modifier(Modifier::BOLD))
        } else if mantras > 0 {
            ("◑", theme::saffron())
        } else {
            ("○", theme::dim())
        };
        dot_spans.push(Span::styled(dot, style));
        dot_spans.push(Span::styled("  ", theme::dim()));
    }

    // Bar filled proportional to streak/30
    let bar_len = 12usize;
    let ratio = (stats.streak as f64 / 30.0).min(1.0);
    let filled = (ratio * bar_len as f64).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(bar_len - filled));

    let streak_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(bar, theme::green()),
        Span::styled(
            format!("  {} days", stats.streak),
            theme::green().add_modifier(Modifier::BOLD),
        ),
    ]);

    let meta_line = Line::from(Span::styled(format!("  Best: {}", best), theme::dim()));

    let text = vec![
        Line::from(""),
        Line::from(dot_spans),
        Line::from(""),
        streak_line,
        meta_line,
    ];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
