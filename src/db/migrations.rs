use anyhow::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS app_state (
            key   TEXT PRIMARY KEY,
            value TEXT
        );

        CREATE TABLE IF NOT EXISTS sounds (
            name     TEXT PRIMARY KEY,
            url      TEXT NOT NULL,
            selected INTEGER DEFAULT 0,
            added_at TEXT DEFAULT (datetime('now'))
        );
    ",
    )?;

    seed_builtins(conn)?;
    Ok(())
}

fn seed_builtins(conn: &Connection) -> Result<()> {
    // Ships with one bundled track; selected on first run only.
    let has_any: i64 = conn.query_row("SELECT COUNT(*) FROM sounds", [], |row| row.get(0))?;
    if has_any == 0 {
        conn.execute(
            "INSERT INTO sounds (name, url, selected)
             VALUES ('Shri Swami Samarth', 'mantras/shri-swami-samarth.mp3', 1)",
            [],
        )?;
    }
    Ok(())
}
