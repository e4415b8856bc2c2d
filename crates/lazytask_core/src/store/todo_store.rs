//! Task-record store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the serialized task collection under one fixed record key.
//! - Recover every read failure to the empty collection, logging the cause.
//!
//! # Invariants
//! - `save` overwrites the whole durable record in a single statement.
//! - The stored payload is the JSON wire shape defined by `model::task`;
//!   it must stay readable by prior versions of the record.
//! - `load` never returns an error to the caller.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::task::Task;
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed logical record name the task collection is stored under.
pub const TODOS_KEY: &str = "todos";

const KV_TABLE: &str = "kv_store";
const KV_COLUMNS: [&str; 3] = ["key", "value", "updated_at"];

pub type StoreResult<T> = Result<T, StoreError>;

/// Store error for persistence setup and write operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialize(serde_json::Error),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize task record: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{column}` on table `{table}`")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Storage contract the engine persists through.
pub trait TodoStore {
    /// Loads the stored task collection, preserving stored order.
    ///
    /// Never fails: an absent record, an unreadable store, or an
    /// unparseable payload all recover to the empty collection.
    fn load(&self) -> Vec<Task>;

    /// Overwrites the entire durable record with the full collection.
    fn save(&self, tasks: &[Task]) -> StoreResult<()>;
}

/// SQLite-backed task-record store.
#[derive(Debug)]
pub struct SqliteTodoStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TodoStore for SqliteTodoStore<'_> {
    fn load(&self) -> Vec<Task> {
        let row = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [TODOS_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional();

        let payload = match row {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("event=store_load module=store status=ok key={TODOS_KEY} count=0 source=absent");
                return Vec::new();
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=recovered key={TODOS_KEY} reason=read_failed error={err}"
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Task>>(&payload) {
            Ok(tasks) => {
                info!(
                    "event=store_load module=store status=ok key={TODOS_KEY} count={}",
                    tasks.len()
                );
                tasks
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=recovered key={TODOS_KEY} reason=parse_failed error={err}"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> StoreResult<()> {
        let payload = serde_json::to_string(tasks)?;

        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![TODOS_KEY, payload],
        )?;

        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, KV_TABLE)? {
        return Err(StoreError::MissingRequiredTable(KV_TABLE));
    }

    for column in KV_COLUMNS {
        if !table_has_column(conn, KV_TABLE, column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: KV_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
