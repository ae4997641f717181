//! Database module - SQLite storage for imported sessions

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::exercises::Muscle;

/// One set to be written with its session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDraft {
    pub exercise_id: String,
    /// 1-based, sequential within the session
    pub set_number: u32,
    pub weight: f64,
    pub reps: u32,
}

/// Per-muscle stimulation summary of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulationDraft {
    pub muscle: Muscle,
    /// 0.0-1.0, max over all sets touching the muscle
    pub max_intensity: f64,
    pub total_sets: u32,
}

/// Everything produced from one imported workout, written atomically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDraft {
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
    pub sets: Vec<SetDraft>,
    pub stimulations: Vec<StimulationDraft>,
}

/// Stored session header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub started_at: NaiveDateTime,
    pub ended_at: NaiveDateTime,
    pub set_count: u32,
}

/// Stored stimulation of one muscle by one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulationRecord {
    pub muscle: Muscle,
    pub stimulated_at: NaiveDateTime,
    pub max_intensity: f64,
    pub total_sets: u32,
    pub session_id: i64,
}

/// Storage used by the importer
pub trait WorkoutStore {
    /// Whether any session starts on the given calendar day
    fn exists_session_on(&self, date: NaiveDate) -> Result<bool>;

    /// Write a session with its sets and stimulations, all or nothing.
    /// Returns the new session id.
    fn save_session(&mut self, session: &SessionDraft) -> Result<i64>;
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("opening database {path}"))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                started_at TEXT NOT NULL,
                ended_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);

            CREATE TABLE IF NOT EXISTS workout_sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL,
                set_number INTEGER NOT NULL,
                weight REAL NOT NULL,
                reps INTEGER NOT NULL CHECK (reps >= 0),
                completed INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS stimulations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                muscle_id TEXT NOT NULL,
                stimulated_at TEXT NOT NULL,
                max_intensity REAL NOT NULL,
                total_sets INTEGER NOT NULL CHECK (total_sets > 0)
            );
            CREATE INDEX IF NOT EXISTS idx_stimulations_muscle ON stimulations(muscle_id, stimulated_at);",
        )?;
        Ok(())
    }

    /// Most recent sessions first
    pub fn get_sessions(&self, limit: usize) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.started_at, s.ended_at,
                    (SELECT COUNT(*) FROM workout_sets w WHERE w.session_id = s.id)
             FROM sessions s
             ORDER BY s.started_at DESC
             LIMIT ?1",
        )?;

        let sessions = stmt
            .query_map(params![limit as i64], |row| {
                Ok(Session {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    ended_at: row.get(2)?,
                    set_count: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    pub fn get_sets(&self, session_id: i64) -> Result<Vec<SetDraft>> {
        let mut stmt = self.conn.prepare(
            "SELECT exercise_id, set_number, weight, reps FROM workout_sets
             WHERE session_id = ?1 ORDER BY set_number",
        )?;

        let sets = stmt
            .query_map(params![session_id], |row| {
                Ok(SetDraft {
                    exercise_id: row.get(0)?,
                    set_number: row.get(1)?,
                    weight: row.get(2)?,
                    reps: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sets)
    }

    /// All stimulation records, newest first
    pub fn get_stimulations(&self) -> Result<Vec<StimulationRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT muscle_id, stimulated_at, max_intensity, total_sets, session_id
             FROM stimulations ORDER BY stimulated_at DESC, id DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let muscle_id: String = row.get(0)?;
                Ok((
                    muscle_id,
                    row.get::<_, NaiveDateTime>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, i64>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let records = rows
            .into_iter()
            .filter_map(|(muscle_id, stimulated_at, max_intensity, total_sets, session_id)| {
                let Some(muscle) = Muscle::from_id(&muscle_id) else {
                    warn!(muscle_id = %muscle_id, "unknown muscle in stimulation record");
                    return None;
                };
                Some(StimulationRecord {
                    muscle,
                    stimulated_at,
                    max_intensity,
                    total_sets,
                    session_id,
                })
            })
            .collect();

        Ok(records)
    }
}

impl WorkoutStore for Database {
    fn exists_session_on(&self, date: NaiveDate) -> Result<bool> {
        let start = date.and_time(NaiveTime::MIN);
        let end = date
            .checked_add_days(Days::new(1))
            .with_context(|| format!("day after {date} is out of range"))?
            .and_time(NaiveTime::MIN);
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE started_at >= ?1 AND started_at < ?2)",
            params![start, end],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn save_session(&mut self, session: &SessionDraft) -> Result<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO sessions (started_at, ended_at) VALUES (?1, ?2)",
            params![session.started_at, session.ended_at],
        )?;
        let session_id = tx.last_insert_rowid();

        {
            let mut insert_set = tx.prepare(
                "INSERT INTO workout_sets (session_id, exercise_id, set_number, weight, reps)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for set in &session.sets {
                insert_set.execute(params![
                    session_id,
                    set.exercise_id,
                    set.set_number,
                    set.weight,
                    set.reps,
                ])?;
            }

            let mut insert_stimulation = tx.prepare(
                "INSERT INTO stimulations (session_id, muscle_id, stimulated_at, max_intensity, total_sets)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for stimulation in &session.stimulations {
                insert_stimulation.execute(params![
                    session_id,
                    stimulation.muscle.id(),
                    session.started_at,
                    stimulation.max_intensity,
                    stimulation.total_sets,
                ])?;
            }
        }

        tx.commit()?;
        Ok(session_id)
    }
}
