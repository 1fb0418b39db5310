// Copyright 2026 Unisearch Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::thread::sleep;
use std::time::Duration;
use std::time::Instant;

use fs2::FileExt;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use sha2::Digest;
use sha2::Sha256;

const SCHEMA_VERSION: i64 = 1;
const LOCK_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store is locked for {mode} access; another process may be using {path}")]
    Locked { mode: &'static str, path: String },
    #[error("store schema version {found} is newer than supported {supported}")]
    SchemaTooNew { found: i64, supported: i64 },
    #[error("store opened read-only")]
    ReadOnly,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Synchronous string key-value persistence.
pub trait PersistentStore: Send {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    ReadOnly,
    ReadWrite,
}

impl StoreMode {
    fn as_label(self) -> &'static str {
        match self {
            StoreMode::ReadOnly => "read",
            StoreMode::ReadWrite => "write",
        }
    }
}

/// SQLite-backed key-value store guarded by an advisory file lock.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
    mode: StoreMode,
    _lock: StoreLock,
}

/// Held for the store's lifetime; the lock file itself is never removed, so
/// every opener contends on the same inode.
struct StoreLock {
    _file: File,
}

impl SqliteStore {
    pub fn open(path: &Path, mode: StoreMode) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // a read-only open of a missing or unversioned store has nothing to
        // read yet; create it first under the write lock
        if mode == StoreMode::ReadOnly && Self::needs_setup(path)? {
            drop(Self::open(path, StoreMode::ReadWrite)?);
        }

        let lock = Self::acquire_lock(path, mode)?;
        let conn = Self::open_connection(path, mode)?;
        Self::apply_pragmas(&conn, mode)?;
        if mode == StoreMode::ReadWrite {
            Self::create_schema(&conn)?;
            Self::migrate(&conn)?;
        }

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            mode,
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn needs_setup(path: &Path) -> StoreResult<bool> {
        if !path.exists() {
            return Ok(true);
        }
        let conn = Self::open_connection(path, StoreMode::ReadOnly)?;
        Ok(Self::schema_version(&conn)? != SCHEMA_VERSION)
    }

    fn open_connection(path: &Path, mode: StoreMode) -> StoreResult<Connection> {
        let flags = match mode {
            StoreMode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY,
            StoreMode::ReadWrite => {
                OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        };
        let conn = Connection::open_with_flags(path, flags)?;
        conn.busy_timeout(LOCK_TIMEOUT)?;
        Ok(conn)
    }

    fn apply_pragmas(conn: &Connection, mode: StoreMode) -> StoreResult<()> {
        if mode == StoreMode::ReadWrite {
            conn.execute_batch("PRAGMA journal_mode=DELETE;\nPRAGMA synchronous=NORMAL;")?;
        }
        Ok(())
    }

    /// Keyed by the canonical parent dir so a store that does not exist yet
    /// maps to the same lock file as it will once created.
    fn lock_path_for(path: &Path) -> StoreResult<PathBuf> {
        let canonical = match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => {
                let parent = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                parent
                    .canonicalize()
                    .map(|dir| dir.join(name))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
            _ => path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
        };
        let mut hasher = Sha256::new();
        hasher.update(canonical.to_string_lossy().as_bytes());
        let hash = hex::encode(hasher.finalize());
        let mut dir = std::env::temp_dir();
        dir.push("unisearch");
        fs::create_dir_all(&dir)?;
        Ok(dir.join(format!("unisearch-{hash}.lock")))
    }

    fn acquire_lock(path: &Path, mode: StoreMode) -> StoreResult<StoreLock> {
        let lock_path = Self::lock_path_for(path)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;
        let deadline = Instant::now() + LOCK_TIMEOUT;
        loop {
            let locked = match mode {
                StoreMode::ReadOnly => file.try_lock_shared().map_err(|err| err.to_string()),
                StoreMode::ReadWrite => file.try_lock_exclusive().map_err(|err| err.to_string()),
            };
            match locked {
                Ok(()) => {
                    return Ok(StoreLock { _file: file });
                }
                Err(_) if Instant::now() >= deadline => {
                    return Err(StoreError::Locked {
                        mode: mode.as_label(),
                        path: path.display().to_string(),
                    });
                }
                Err(_) => sleep(Duration::from_millis(50)),
            }
        }
    }

    fn create_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meta (\n  key TEXT PRIMARY KEY,\n  value TEXT\n);\n\nCREATE TABLE IF NOT EXISTS kv (\n  key TEXT PRIMARY KEY,\n  value TEXT NOT NULL,\n  updated_at TEXT\n);",
        )?;
        Ok(())
    }

    fn set_meta(conn: &Connection, key: &str, value: &str) -> StoreResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn table_exists(conn: &Connection, name: &str) -> StoreResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn column_exists(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
        for row in rows {
            if row? == column {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn schema_version(conn: &Connection) -> StoreResult<i64> {
        if !Self::table_exists(conn, "meta")? {
            return Ok(0);
        }
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key='schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.and_then(|v| v.parse::<i64>().ok()).unwrap_or(0))
    }

    fn migrate(conn: &Connection) -> StoreResult<()> {
        let version = Self::schema_version(conn)?;
        if version > SCHEMA_VERSION {
            return Err(StoreError::SchemaTooNew {
                found: version,
                supported: SCHEMA_VERSION,
            });
        }
        if version == SCHEMA_VERSION {
            return Ok(());
        }

        if !Self::column_exists(conn, "kv", "updated_at")? {
            conn.execute("ALTER TABLE kv ADD COLUMN updated_at TEXT", [])?;
        }
        Self::set_meta(conn, "schema_version", &SCHEMA_VERSION.to_string())?;
        Ok(())
    }
}

impl PersistentStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.mode == StoreMode::ReadOnly {
            return Err(StoreError::ReadOnly);
        }
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))\n             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }
}
