use ratatui::style::{Color, Modifier, Style};

pub const BG: Color = Color::Rgb(16, 14, 18);
pub const SURFACE: Color = Color::Rgb(26, 22, 28);
pub const BORDER: Color = Color::Rgb(52, 42, 56);
pub const TEXT: Color = Color::Rgb(228, 216, 200);
pub const TEXT_DIM: Color = Color::Rgb(126, 112, 104);
pub const SAFFRON: Color = Color::Rgb(224, 142, 54);
pub const GOLD: Color = Color::Rgb(198, 164, 74);
pub const GREEN: Color = Color::Rgb(96, 150, 96);
pub const RED: Color = Color::Rgb(182, 84, 64);

pub fn base() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn saffron() -> Style {
    Style::default().fg(SAFFRON)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(TEXT).bg(SURFACE)
}
