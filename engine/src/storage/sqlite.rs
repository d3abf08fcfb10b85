use super::SignalStore;
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use shared::models::{SignalKind, SignalRecord};
use shared::utils::format_timestamp;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// SQLite file, or `:memory:`.
    pub path: PathBuf,
}

/// Signals table in a single SQLite connection. Calls run on the blocking pool.
#[derive(Clone)]
pub struct SqliteSignalStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSignalStore {
    pub fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let conn = if path.as_os_str() == ":memory:" {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        };
        Self::from_connection(conn)
    }

    pub fn in_memory() -> EngineResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> EngineResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> EngineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> EngineResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| EngineError::ProcessingError("signal store connection poisoned".to_string()))?;
            f(&*guard)
        })
        .await
        .map_err(|e| EngineError::AnyhowError(anyhow::anyhow!("signal store task failed: {}", e)))?
    }
}

fn init_schema(conn: &Connection) -> EngineResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS signals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ts TEXT NOT NULL,
            kind TEXT NOT NULL,
            outcome TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_signals_ts ON signals(ts DESC);
        "#,
    )?;
    Ok(())
}

fn insert_record(conn: &Connection, record: &SignalRecord) -> EngineResult<()> {
    conn.execute(
        "INSERT INTO signals (ts, kind, outcome, description) VALUES (?1, ?2, ?3, ?4)",
        params![
            format_timestamp(&record.timestamp),
            record.kind.as_str(),
            record.outcome,
            record.description,
        ],
    )?;
    Ok(())
}

fn select_latest(conn: &Connection) -> EngineResult<Option<SignalRecord>> {
    let row = conn
        .query_row(
            "SELECT ts, kind, outcome, description FROM signals ORDER BY id DESC LIMIT 1",
            [],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((ts, kind, outcome, description)) = row else {
        return Ok(None);
    };
    let timestamp = NaiveDateTime::parse_from_str(&ts, TS_FORMAT)
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
        .map_err(|e| EngineError::ProcessingError(format!("stored timestamp '{}': {}", ts, e)))?;
    let kind = SignalKind::parse(&kind)
        .ok_or_else(|| EngineError::ProcessingError(format!("stored signal kind '{}' not recognised", kind)))?;

    Ok(Some(SignalRecord {
        timestamp,
        kind,
        outcome,
        description,
    }))
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    async fn save(&self, record: &SignalRecord) -> EngineResult<()> {
        let record = record.clone();
        self.with_conn(move |conn| insert_record(conn, &record)).await
    }

    async fn latest(&self) -> EngineResult<Option<SignalRecord>> {
        self.with_conn(select_latest).await
    }
}
