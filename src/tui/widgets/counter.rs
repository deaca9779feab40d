use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::models::MANTRAS_PER_MALA;
use crate::tui::theme;
use crate::utils::format::progress_bar;

pub fn render(frame: &mut Frame, area: Rect, current_count: u32, session_malas: u32) {
    let block = Block::default()
        .title(Span::styled(" Current Mala ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(theme::BORDER))
        .style(theme::surface());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // breathing room
            Constraint::Min(4),    // big count
            Constraint::Length(1), // bead bar
            Constraint::Length(1), // session malas
        ])
        .split(inner);

    let big = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .alignment(Alignment::Center)
        .style(theme::saffron().add_modifier(Modifier::BOLD))
        .lines(vec![format!("{}", current_count).into()])
        .build();
    frame.render_widget(big, chunks[1]);

    let bar = progress_bar(u64::from(current_count), u64::from(MANTRAS_PER_MALA), 27);
    let bar_line = Line::from(vec![
        Span::styled(bar, theme::saffron()),
        Span::styled(
            format!("  {}/{}", current_count, MANTRAS_PER_MALA),
            theme::dim(),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(bar_line).alignment(Alignment::Center),
        chunks[2],
    );

    let malas_line = Line::from(Span::styled(
        format!("session malas: {}", session_malas),
        theme::dim(),
    ));
    frame.render_widget(
        Paragraph::new(malas_line).alignment(Alignment::Center),
        chunks[3],
    );
}
