use anyhow::{anyhow, Result};
use chrono::Local;
use rusqlite::Connection;
use std::io::{self, BufRead, Write};

use crate::cli::args::{ResetCommands, SoundCommands};
use crate::config::AppConfig;
use crate::db::repository::SoundRepo;
use crate::engine::{Achievement, EngineEvent, EngineOptions, Kind, PracticeEngine};
use crate::models::{date_str, MANTRAS_PER_MALA};
use crate::utils::format::{format_speed, progress_bar};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn load_engine(conn: &Connection, config: &AppConfig) -> PracticeEngine {
    let today = Local::now().date_naive();
    let opts = EngineOptions::from_config(config);
    PracticeEngine::load(conn, today, &opts)
}

/// Print every message-bearing engine event in its notification color.
fn print_events(engine: &mut PracticeEngine) {
    for event in engine.take_events() {
        let Some(message) = event.message() else {
            continue;
        };
        match event.kind() {
            Kind::Success => println_colored!(GREEN, "  ✓ {}", message),
            Kind::Error => println_colored!(RED, "  ✗ {}", message),
            Kind::Info => match event {
                EngineEvent::MalaCompleted { .. } => {
                    println_colored!(GOLD, "  ❁ {}", message)
                }
                _ => println_colored!(AMBER, "  {}", message),
            },
        }
    }
}

// ─── Count ───────────────────────────────────────────────────────────────────

pub fn handle_count(conn: &Connection, config: &AppConfig, times: u32) -> Result<()> {
    if times == 0 {
        return Err(anyhow!("Nothing to record — count must be at least 1"));
    }
    let today = Local::now().date_naive();
    let mut engine = load_engine(conn, config);

    for _ in 0..times {
        engine.increment(conn, today);
    }

    println!();
    print_events(&mut engine);
    let stats = engine.stats();
    println_colored!(
        GREEN,
        "  ✓ Recorded {} — bead {}/{}",
        times,
        engine.session().current_count,
        MANTRAS_PER_MALA
    );
    println_colored!(
        DIM,
        "  Today: {} mantras · {}/{} malas",
        stats.daily_mantras,
        stats.daily_malas,
        stats.goal_malas
    );
    println!();
    Ok(())
}

// ─── Goal ────────────────────────────────────────────────────────────────────

pub fn handle_goal(conn: &Connection, config: &AppConfig, malas: u32) -> Result<()> {
    let mut engine = load_engine(conn, config);
    engine
        .set_goal_malas(conn, malas)
        .map_err(|e| anyhow!("{}", e))?;
    print_events(&mut engine);
    Ok(())
}

// ─── Speed ───────────────────────────────────────────────────────────────────

pub fn handle_speed(config: &mut AppConfig, speed: f64) -> Result<()> {
    if speed <= 0.0 || !speed.is_finite() {
        return Err(anyhow!("Playback speed must be positive, got {}", speed));
    }
    config.audio.speed = speed;
    config.save()?;
    println_colored!(
        GREEN,
        "  ✓ Default playback speed set to {}",
        format_speed(speed)
    );
    Ok(())
}

// ─── Stats ───────────────────────────────────────────────────────────────────

pub fn handle_stats(conn: &Connection, config: &AppConfig, week: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let engine = load_engine(conn, config);
    let stats = engine.stats();

    println!();
    println_colored!(GOLD, "  Practice Statistics");
    println!();
    println_colored!(
        BOLD,
        "  Lifetime:    {} mantras · {} malas",
        stats.total_mantras,
        stats.total_malas
    );
    println!(
        "  Today:       {} mantras · {}/{} malas  {}",
        stats.daily_mantras,
        stats.daily_malas,
        stats.goal_malas,
        progress_bar(stats.daily_malas, u64::from(stats.goal_malas), 12)
    );
    println_colored!(
        BOLD,
        "  Streak:      {} days current  |  {} days best",
        stats.streak,
        engine.best_streak()
    );

    println!();
    println_colored!(GOLD, "  Achievements");
    for a in Achievement::all() {
        if a.is_set(&stats.achievements) {
            println_colored!(GREEN, "  ✓ {}", a.display_name());
        } else {
            println_colored!(DIM, "  ○ {}", a.display_name());
        }
    }

    if week {
        println!();
        println_colored!(DIM, "  Last 7 days  (● = goal met, ◕ = halfway, ◑ = some, ○ = none)");
        println!();
        print!("  ");
        let goal = u64::from(stats.goal_malas);
        for offset in (0..7).rev() {
            let date = date_str(today - chrono::Duration::days(offset));
            let record = stats.day_record(&date);
            let malas = record.map(|r| r.malas).unwrap_or(0);
            let mantras = record.map(|r| r.mantras).unwrap_or(0);
            let icon = if malas >= goal {
                format!("{}●\x1b[0m ", GREEN)
            } else if malas * 2 >= goal {
                format!("{}◕\x1b[0m ", AMBER)
            } else if mantras > 0 {
                format!("{}◑\x1b[0m ", AMBER)
            } else {
                format!("{}○\x1b[0m ", DIM)
            };
            print!("{}", icon);
        }
        println!();
    }

    println!();
    Ok(())
}

// ─── Sounds ──────────────────────────────────────────────────────────────────

pub fn handle_sounds(conn: &Connection, action: &SoundCommands) -> Result<()> {
    match action {
        SoundCommands::Add { name, url } => {
            SoundRepo::upsert(conn, name, url)?;
            println_colored!(GREEN, "  ✓ Added sound: {}", name);
        }
        SoundCommands::List => {
            let sounds = SoundRepo::list(conn)?;
            println!();
            println_colored!(GOLD, "  Mantra Sounds");
            println!();
            if sounds.is_empty() {
                println_colored!(DIM, "  (none — add one with `japa sounds add`)");
            }
            for sound in &sounds {
                let marker = if sound.selected { "▸" } else { " " };
                println!("  {} {:<28}  {}", marker, sound.name, sound.url);
            }
            println!();
        }
        SoundCommands::Select { name } => {
            if SoundRepo::select(conn, name)? {
                println_colored!(GREEN, "  ✓ Now using: {}", name);
            } else {
                return Err(anyhow!("No sound named '{}'", name));
            }
        }
        SoundCommands::Remove { name } => {
            if SoundRepo::remove(conn, name)? {
                println_colored!(AMBER, "  Removed sound: {}", name);
            } else {
                return Err(anyhow!("No sound named '{}'", name));
            }
        }
    }
    Ok(())
}

// ─── Reset ───────────────────────────────────────────────────────────────────

pub fn handle_reset(conn: &Connection, config: &AppConfig, target: &ResetCommands) -> Result<()> {
    let mut engine = load_engine(conn, config);
    match target {
        ResetCommands::Daily => {
            engine.reset_daily_count(conn);
            print_events(&mut engine);
        }
        ResetCommands::All { yes } => {
            if !yes {
                println_colored!(
                    RED,
                    "  This erases all statistics, history and achievements. It cannot be undone."
                );
                let answer = prompt("  Type 'yes' to confirm: ")?;
                if !answer.eq_ignore_ascii_case("yes") && !answer.eq_ignore_ascii_case("y") {
                    println_colored!(DIM, "  Aborted — nothing was changed.");
                    return Ok(());
                }
            }
            let today = Local::now().date_naive();
            engine.reset_all(conn, today);
            print_events(&mut engine);
        }
    }
    Ok(())
}

// ─── Export ──────────────────────────────────────────────────────────────────

pub fn handle_export(conn: &Connection, config: &AppConfig) -> Result<()> {
    let today = Local::now().date_naive();
    let engine = load_engine(conn, config);
    let stats = engine.stats();
    let goal = u64::from(stats.goal_malas);

    println!("# japa — Weekly Summary");
    println!("# {}", date_str(today));
    println!();
    println!("## Malas (last 7 days, goal {})", stats.goal_malas);
    for offset in (0..7).rev() {
        let date = date_str(today - chrono::Duration::days(offset));
        let record = stats.day_record(&date);
        let malas = record.map(|r| r.malas).unwrap_or(0);
        let mantras = record.map(|r| r.mantras).unwrap_or(0);
        println!(
            "  {}  {:>3} malas  {}  ({} mantras)",
            date,
            malas,
            progress_bar(malas, goal, 5),
            mantras
        );
    }
    println!();
    println!("## Summary");
    println!("  Lifetime:   {} mantras, {} malas", stats.total_mantras, stats.total_malas);
    println!(
        "  Streak:     {} days (best: {})",
        stats.streak,
        engine.best_streak()
    );
    let unlocked: Vec<&str> = Achievement::all()
        .into_iter()
        .filter(|a| a.is_set(&stats.achievements))
        .map(|a| a.display_name())
        .collect();
    println!(
        "  Unlocked:   {}",
        if unlocked.is_empty() {
            "—".to_string()
        } else {
            unlocked.join(", ")
        }
    );
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    io::stdin().lock().read_line(&mut buf)?;
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}
