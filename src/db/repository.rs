use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Snapshot, Sound};

// ─── App state (key → JSON blob) ────────────────────────────────────────────

pub const SNAPSHOT_KEY: &str = "practice_snapshot";

pub struct StateRepo;

impl StateRepo {
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM app_state WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(anyhow::Error::from)
    }

    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO app_state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )?;
        Ok(())
    }
}

// ─── Practice snapshot ───────────────────────────────────────────────────────

pub struct SnapshotRepo;

impl SnapshotRepo {
    /// Load the persisted snapshot. A missing or unreadable blob is treated
    /// as absent — the caller starts from defaults.
    pub fn load(conn: &Connection) -> Result<Option<Snapshot>> {
        match StateRepo::get(conn, SNAPSHOT_KEY)? {
            None => Ok(None),
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(snap) => Ok(Some(snap)),
                Err(e) => {
                    log::warn!("Unreadable practice snapshot, starting fresh: {}", e);
                    Ok(None)
                }
            },
        }
    }

    pub fn save(conn: &Connection, snapshot: &Snapshot) -> Result<()> {
        let raw = serde_json::to_string(snapshot)?;
        StateRepo::set(conn, SNAPSHOT_KEY, &raw)
    }
}

// ─── Sound library ───────────────────────────────────────────────────────────

pub struct SoundRepo;

impl SoundRepo {
    /// Add or replace a source by name. Last write wins on a duplicate name.
    pub fn upsert(conn: &Connection, name: &str, url: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO sounds (name, url) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET url = ?2",
            params![name, url],
        )?;
        Ok(())
    }

    pub fn list(conn: &Connection) -> Result<Vec<Sound>> {
        let mut stmt =
            conn.prepare("SELECT name, url, selected FROM sounds ORDER BY added_at, name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Sound {
                name: row.get(0)?,
                url: row.get(1)?,
                selected: row.get::<_, i32>(2)? != 0,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(anyhow::Error::from)
    }

    /// Returns false if no source with that name exists.
    pub fn remove(conn: &Connection, name: &str) -> Result<bool> {
        let n = conn.execute("DELETE FROM sounds WHERE name = ?1", params![name])?;
        Ok(n > 0)
    }

    /// Mark one source as the active track. Returns false if the name is unknown.
    pub fn select(conn: &Connection, name: &str) -> Result<bool> {
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sounds WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Ok(false);
        }
        conn.execute("UPDATE sounds SET selected = 0", [])?;
        conn.execute(
            "UPDATE sounds SET selected = 1 WHERE name = ?1",
            params![name],
        )?;
        Ok(true)
    }

    pub fn selected(conn: &Connection) -> Result<Option<Sound>> {
        conn.query_row(
            "SELECT name, url, selected FROM sounds WHERE selected = 1 LIMIT 1",
            [],
            |row| {
                Ok(Sound {
                    name: row.get(0)?,
                    url: row.get(1)?,
                    selected: true,
                })
            },
        )
        .optional()
        .map_err(anyhow::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::Stats;
    use chrono::NaiveDate;

    fn mem_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn state_get_absent_key() {
        let conn = mem_conn();
        assert_eq!(StateRepo::get(&conn, "nope").unwrap(), None);
    }

    #[test]
    fn state_set_then_get() {
        let conn = mem_conn();
        StateRepo::set(&conn, "k", "v1").unwrap();
        StateRepo::set(&conn, "k", "v2").unwrap();
        assert_eq!(StateRepo::get(&conn, "k").unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn snapshot_load_absent_and_corrupt() {
        let conn = mem_conn();
        assert!(SnapshotRepo::load(&conn).unwrap().is_none());
        StateRepo::set(&conn, SNAPSHOT_KEY, "{not json").unwrap();
        assert!(SnapshotRepo::load(&conn).unwrap().is_none());
    }

    #[test]
    fn snapshot_save_then_load() {
        let conn = mem_conn();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let snap = Snapshot {
            current_count: 42,
            stats: Stats::fresh(today),
        };
        SnapshotRepo::save(&conn, &snap).unwrap();
        assert_eq!(SnapshotRepo::load(&conn).unwrap(), Some(snap));
    }

    #[test]
    fn sound_upsert_last_write_wins() {
        let conn = mem_conn();
        SoundRepo::upsert(&conn, "Om", "om-v1.mp3").unwrap();
        SoundRepo::upsert(&conn, "Om", "om-v2.mp3").unwrap();
        let sounds = SoundRepo::list(&conn).unwrap();
        let om = sounds.iter().find(|s| s.name == "Om").unwrap();
        assert_eq!(om.url, "om-v2.mp3");
        assert_eq!(sounds.iter().filter(|s| s.name == "Om").count(), 1);
    }

    #[test]
    fn sound_select_is_exclusive() {
        let conn = mem_conn();
        SoundRepo::upsert(&conn, "Om", "om.mp3").unwrap();
        assert!(SoundRepo::select(&conn, "Om").unwrap());
        assert!(!SoundRepo::select(&conn, "missing").unwrap());
        let sounds = SoundRepo::list(&conn).unwrap();
        assert_eq!(sounds.iter().filter(|s| s.selected).count(), 1);
        assert_eq!(SoundRepo::selected(&conn).unwrap().unwrap().name, "Om");
    }

    #[test]
    fn sound_remove() {
        let conn = mem_conn();
        SoundRepo::upsert(&conn, "Om", "om.mp3").unwrap();
        assert!(SoundRepo::remove(&conn, "Om").unwrap());
        assert!(!SoundRepo::remove(&conn, "Om").unwrap());
    }

    #[test]
    fn seeded_builtin_is_present_and_selected() {
        let conn = mem_conn();
        let selected = SoundRepo::selected(&conn).unwrap().unwrap();
        assert_eq!(selected.name, "Shri Swami Samarth");
    }
}
