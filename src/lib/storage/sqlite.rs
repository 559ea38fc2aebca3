use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite};
use tracing::{debug, info};

use crate::core::{Todo, TodoId};
use crate::storage::TodoStore;

pub const DB_FILE_NAME: &str = "app.db";

const CREATE_TODOS: &str = "CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        done BOOLEAN NOT NULL DEFAULT 0,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )";

#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub busy_timeout: Duration,
    pub max_connections: u32,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            max_connections: 5,
        }
    }
}

/// Raw row as SQLite hands it back; `done` is stored as 0/1.
#[derive(FromRow)]
struct TodoRow {
    id: i64,
    text: String,
    done: i64,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            text: row.text,
            done: row.done != 0,
        }
    }
}

/// Todo store backed by a single SQLite file.
///
/// Every operation checks one connection out of the pool and returns it when
/// the operation ends, whether it succeeded or not. SQLite admits one writer
/// at a time: concurrent inserts wait on the database lock for up to
/// `busy_timeout` and fail with a storage error after that. The database runs
/// in WAL mode so readers are not blocked by a pending write.
pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteStore {
    /// Opens `<dir>/app.db`, creating the directory and the database file
    /// when they are missing. Does not create the schema; see
    /// [`TodoStore::initialize`].
    pub async fn open(dir: impl AsRef<Path>, config: SqliteConfig) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        let path = dir.join(DB_FILE_NAME);
        let existed = path
            .try_exists()
            .with_context(|| format!("failed to inspect database {}", path.display()))?;
        if existed {
            debug!(path = %path.display(), "Database already exists");
        } else {
            info!(path = %path.display(), "Creating database");
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database {}", path.display()))?;

        info!(
            path = %path.display(),
            max_connections = config.max_connections,
            "SQLite store opened"
        );
        Ok(Self { pool, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .context("failed to acquire connection")
    }

    /// Closes the pool; operations issued afterwards fail.
    pub async fn close(&self) {
        self.pool.close().await;
        info!(path = %self.path.display(), "SQLite store closed");
    }
}

#[async_trait]
impl TodoStore for SqliteStore {
    async fn initialize(&self) -> Result<()> {
        let mut conn = self.acquire().await?;
        sqlx::query(CREATE_TODOS)
            .execute(&mut *conn)
            .await
            .context("failed to create todos table")?;
        Ok(())
    }

    /// Rows come back in SQLite's default scan order (rowid, so in practice
    /// insertion order). No ordering is guaranteed.
    async fn list_todos(&self) -> Result<Vec<Todo>> {
        let mut conn = self.acquire().await?;
        let rows = sqlx::query_as::<_, TodoRow>("SELECT id, text, done FROM todos")
            .fetch_all(&mut *conn)
            .await
            .context("failed to list todos")?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn insert_todo(&self, text: &str) -> Result<TodoId> {
        let mut conn = self.acquire().await?;
        let result = sqlx::query("INSERT INTO todos (text, done) VALUES (?, ?)")
            .bind(text)
            .bind(false)
            .execute(&mut *conn)
            .await
            .context("failed to insert todo")?;
        Ok(result.last_insert_rowid())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.acquire().await?;
        sqlx::query("SELECT 1")
            .execute(&mut *conn)
            .await
            .context("database ping failed")?;
        Ok(())
    }
}
