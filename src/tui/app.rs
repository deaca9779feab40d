use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::repository::SoundRepo;
use crate::engine::{Achievement, EngineEvent, EngineOptions, Kind, PracticeEngine};
use crate::models::date_str;
use crate::playback::{Driver, NullDriver};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{counter, goal, header, playback, statusbar, streak};

const TICK_RATE: Duration = Duration::from_millis(250);
const TOAST_TTL: Duration = Duration::from_secs(3);
const SPEEDS: [f64; 3] = [0.75, 1.0, 1.5];

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    GoalInput,
}

pub struct Toast {
    pub message: String,
    pub kind: Kind,
    pub at: Instant,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub engine: PracticeEngine,
    pub driver: Box<dyn Driver>,
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub input_error: Option<String>, // shown in goal popup on bad input
    pub show_reset_confirm: bool,    // `R` opens this; only `y` proceeds
    pub today: NaiveDate,
    pub sound_name: Option<String>,
    pub toast: Option<Toast>,
}

impl App {
    pub fn new(conn: &Connection, config: AppConfig) -> Self {
        let today = Local::now().date_naive();
        let opts = EngineOptions::from_config(&config);
        let engine = PracticeEngine::load(conn, today, &opts);

        let mut driver: Box<dyn Driver> =
            Box::new(NullDriver::new(config.audio.volume, config.audio.speed));
        let sound = SoundRepo::selected(conn).unwrap_or_else(|e| {
            log::warn!("Could not read sound library: {}", e);
            None
        });
        if let Some(s) = &sound {
            driver.set_source(&s.url);
        }

        App {
            view: View::Dashboard,
            config,
            engine,
            driver,
            should_quit: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            input_error: None,
            show_reset_confirm: false,
            today,
            sound_name: sound.map(|s| s.name),
            toast: None,
        }
    }

    // ── Event handling ────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent, conn: &Connection) {
        // Only handle actual key presses — ignore release/repeat events from
        // some terminals
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.show_reset_confirm {
            self.handle_reset_confirm_key(key, conn);
            return;
        }
        match self.input_mode {
            InputMode::GoalInput => self.handle_goal_input(key, conn),
            InputMode::Normal => match self.view {
                View::Dashboard => self.handle_dashboard_key(key, conn),
                View::Stats => self.handle_stats_key(key),
                View::Help => self.handle_help_key(key),
            },
        }
        self.drain_events();
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent, conn: &Connection) {
        let now = Instant::now();
        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                // Resolve the date here, not from the cached one — a tap right
                // after midnight must land on the new day.
                self.today = Local::now().date_naive();
                self.engine.increment(conn, self.today);
            }
            KeyCode::Char('p') => {
                self.engine.toggle_playback(now);
            }
            KeyCode::Char('a') => {
                self.engine.toggle_auto_repeat(now);
            }
            KeyCode::Char('[') => self.cycle_speed(-1, now),
            KeyCode::Char(']') => self.cycle_speed(1, now),
            KeyCode::Char('g') => {
                self.input_mode = InputMode::GoalInput;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('r') => {
                self.engine.reset_daily_count(conn);
            }
            KeyCode::Char('R') => {
                self.show_reset_confirm = true;
            }
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('s') => {
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') => {
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_reset_confirm_key(&mut self, key: KeyEvent, conn: &Connection) {
        self.show_reset_confirm = false;
        // The gate: only an explicit `y` destroys data, anything else cancels.
        if key.code == KeyCode::Char('y') {
            self.engine.reset_all(conn, self.today);
            self.drain_events();
        } else {
            self.toast = Some(Toast {
                message: "Reset cancelled — nothing was changed".to_string(),
                kind: Kind::Info,
                at: Instant::now(),
            });
        }
    }

    fn handle_goal_input(&mut self, key: KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.input_error = None;
            }
            KeyCode::Enter => {
                let trimmed = self.input_buffer.trim().to_string();
                if trimmed.is_empty() {
                    self.input_error = Some("Enter a number first (1-108)".to_string());
                    return;
                }
                match trimmed.parse::<u32>() {
                    Ok(goal) => match self.engine.set_goal_malas(conn, goal) {
                        Ok(()) => {
                            self.input_mode = InputMode::Normal;
                            self.input_buffer.clear();
                            self.input_error = None;
                        }
                        Err(e) => {
                            self.input_error = Some(e.to_string());
                        }
                    },
                    Err(_) => {
                        self.input_error = Some(format!("'{}' is not a valid number", trimmed));
                    }
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_error = None;
            }
            KeyCode::Char(c) if c.is_ascii_digit() && self.input_buffer.len() < 3 => {
                self.input_buffer.push(c);
                self.input_error = None;
            }
            _ => {}
        }
    }

    fn cycle_speed(&mut self, step: i32, now: Instant) {
        let current = self.engine.session().playback_speed;
        let idx = SPEEDS
            .iter()
            .position(|s| (*s - current).abs() < f64::EPSILON)
            .unwrap_or(1);
        let next = (idx as i32 + step).clamp(0, SPEEDS.len() as i32 - 1) as usize;
        if next != idx {
            // speeds are a fixed positive set, rejection cannot happen here
            let _ = self.engine.set_playback_speed(SPEEDS[next], now);
        }
    }

    // ── Tick ──────────────────────────────────────────────────────────

    pub fn tick(&mut self, conn: &Connection) {
        let now = Instant::now();

        // Midnight check: a session left open rolls its dailies over without
        // waiting for the next count.
        let today = Local::now().date_naive();
        if today != self.today {
            self.today = today;
            self.engine.reconcile_day(conn, today);
        }

        self.engine.tick(conn, today, now);

        // End-of-track maps to one recitation; the engine decides whether the
        // track restarts. Handled here, on a fresh turn, never inside an
        // increment.
        if self.driver.take_ended() && self.engine.track_ended(conn, today) {
            if let Err(e) = self.driver.play() {
                self.engine.playback_failed(&e.to_string(), now);
            }
        }

        self.drain_events();

        if let Some(toast) = &self.toast {
            if toast.at.elapsed() >= TOAST_TTL {
                self.toast = None;
            }
        }
    }

    /// Route queued engine events: driver cues to the driver, messages to the
    /// toast line.
    fn drain_events(&mut self) {
        for event in self.engine.take_events() {
            match &event {
                EngineEvent::PlaybackToggled { playing } => {
                    if *playing {
                        // A failure queues its own event; it surfaces on the
                        // next drain rather than recursing into this one.
                        if let Err(e) = self.driver.play() {
                            self.engine.playback_failed(&e.to_string(), Instant::now());
                        }
                    } else {
                        self.driver.pause();
                    }
                }
                EngineEvent::SpeedChanged { speed } => self.driver.set_rate(*speed),
                EngineEvent::Chime => log::debug!("completion bell"),
                EngineEvent::Haptic(_) => {}
                _ => {}
            }
            if let Some(message) = event.message() {
                self.toast = Some(Toast {
                    message,
                    kind: event.kind(),
                    at: Instant::now(),
                });
            }
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }

        if self.input_mode == InputMode::GoalInput {
            self.draw_goal_input(frame);
        }

        if self.show_reset_confirm {
            self.draw_reset_confirm(frame);
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(frame, outer_chunks[0]);
        statusbar::render(
            frame,
            outer_chunks[2],
            self.toast.as_ref().map(|t| (t.message.as_str(), t.kind)),
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(outer_chunks[1]);

        // Left column: live counter + today's goal
        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(9), Constraint::Length(5)])
            .split(columns[0]);

        counter::render(
            frame,
            left_chunks[0],
            self.engine.session().current_count,
            self.engine.session().current_mala_count,
        );
        goal::render(frame, left_chunks[1], self.engine.stats());

        // Right column: playback + streak
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(7),
                Constraint::Min(0),
            ])
            .split(columns[1]);

        playback::render(
            frame,
            right_chunks[0],
            self.engine.session(),
            self.sound_name.as_deref(),
            self.config.audio.volume,
        );
        streak::render(
            frame,
            right_chunks[1],
            self.engine.stats(),
            self.engine.best_streak(),
            self.today,
        );
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Statistics  ", theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let stats = self.engine.stats();
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Lifetime:   ", theme::dim()),
                Span::styled(
                    format!("{} mantras · {} malas", stats.total_mantras, stats.total_malas),
                    theme::bold(),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Today:      ", theme::dim()),
                Span::styled(
                    format!(
                        "{} mantras · {}/{} malas",
                        stats.daily_mantras, stats.daily_malas, stats.goal_malas
                    ),
                    theme::saffron(),
                ),
            ]),
            Line::from(vec![
                Span::styled("  Streak:     ", theme::dim()),
                Span::styled(
                    format!("{} days", stats.streak),
                    theme::green().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("   best {}", self.engine.best_streak()),
                    theme::dim(),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled("  Achievements", theme::gold())),
            Line::from(""),
        ];

        for a in Achievement::all() {
            let line = if a.is_set(&stats.achievements) {
                Line::from(vec![
                    Span::styled("  ✓ ", theme::green()),
                    Span::styled(a.display_name(), theme::green()),
                ])
            } else {
                Line::from(vec![
                    Span::styled("  ○ ", theme::dim()),
                    Span::styled(a.display_name(), theme::dim()),
                ])
            };
            lines.push(line);
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  Last 7 Days", theme::gold())));
        lines.push(Line::from(""));

        let goal = u64::from(stats.goal_malas);
        for offset in (0..7).rev() {
            let date = date_str(self.today - chrono::Duration::days(offset));
            let record = stats.day_record(&date);
            let malas = record.map(|r| r.malas).unwrap_or(0);
            let mantras = record.map(|r| r.mantras).unwrap_or(0);
            let width = 12usize;
            let filled = if goal == 0 {
                0
            } else {
                ((malas.min(goal) as f64 / goal as f64) * width as f64).round() as usize
            };
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(width - filled));
            let bar_style = if malas >= goal {
                theme::green()
            } else if mantras > 0 {
                theme::saffron()
            } else {
                theme::dim()
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", bar), bar_style),
                Span::styled(
                    format!("{}  {} malas · {} mantras", date, malas, mantras),
                    theme::dim(),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).min(16),
        };

        frame.render_widget(Clear, popup_area);

        let entries = [
            ("[Space] / Enter", "Count one recitation"),
            ("[p]", "Play / pause the mantra track"),
            ("[a]", "Toggle auto-count"),
            ("[ [ ] ]", "Slower / faster playback"),
            ("[g]", "Set the daily mala goal"),
            ("[r]", "Reset session count"),
            ("[R]", "Reset everything (asks first)"),
            ("[s]", "Stats view"),
            ("[?]", "Toggle help"),
            ("[Esc]", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in &entries {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<16}", key), theme::gold()),
                Span::styled(*label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }

    fn draw_goal_input(&self, frame: &mut Frame) {
        let area = frame.area();
        let height = if self.input_error.is_some() { 7 } else { 5 };

        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 2 - 3,
            width: area.width / 2,
            height,
        };

        frame.render_widget(Clear, popup_area);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  Malas per day: ", theme::dim()),
                Span::styled(
                    self.input_buffer.as_str(),
                    theme::gold().add_modifier(Modifier::BOLD),
                ),
                Span::styled("█", theme::saffron()), // block cursor
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "  Type 1-108, then [Enter]  ·  [Esc] cancel",
                theme::dim(),
            )),
        ];

        if let Some(err) = &self.input_error {
            text.push(Line::from(""));
            text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
        }

        let border_style = if self.input_error.is_some() {
            theme::red()
        } else {
            theme::saffron()
        };

        let block = Block::default()
            .title(Span::styled(" Daily Goal ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }

    fn draw_reset_confirm(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 3,
            width: area.width / 2,
            height: 8,
        };

        frame.render_widget(Clear, popup_area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Erase ALL statistics, history and achievements?",
                theme::red().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("  This cannot be undone.", theme::red())),
            Line::from(""),
            Line::from(vec![
                Span::styled("  [y]", theme::red().add_modifier(Modifier::BOLD)),
                Span::styled(" erase everything   ", theme::dim()),
                Span::styled("[any other key]", theme::gold()),
                Span::styled(" cancel", theme::dim()),
            ]),
        ];

        let block = Block::default()
            .title(Span::styled(" Reset All ", theme::red()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::red())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let mut app = App::new(&conn, config);

    let mut terminal = ratatui::init();
    let events = EventHandler::new(TICK_RATE);

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key, &conn);
                if app.should_quit {
                    break;
                }
            }
            Event::Tick => {
                app.tick(&conn);
            }
        }
    }

    ratatui::restore();
    Ok(())
}
