use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::Stats;
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(frame: &mut Frame, area: Rect, stats: &Stats) {
    let block = Block::default()
        .title(Span::styled(" Today ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let goal = u64::from(stats.goal_malas);
    let bar = progress_bar(stats.daily_malas, goal, 14);
    let goal_met = stats.daily_malas >= goal;

    let bar_line = Line::from(vec![
        Span::styled("  ", theme::dim()),
        Span::styled(bar, if goal_met { theme::green() } else { theme::saffron() }),
        Span::styled(
            format!("  {}/{} malas", stats.daily_malas, stats.goal_malas),
            if goal_met {
                theme::green().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            },
        ),
        if goal_met {
            Span::styled("  ✓", theme::green())
        } else {
            Span::raw("")
        },
    ]);

    let mantras_line = Line::from(Span::styled(
        format!("  {} mantras today", stats.daily_mantras),
        theme::dim(),
    ));

    let text = vec![Line::from(""), bar_line, mantras_line];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
