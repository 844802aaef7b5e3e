pub mod contacts;
pub mod migrations;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Where the contacts table lives, parsed from the `database_url` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    File(PathBuf),
    Memory,
}

#[derive(Clone)]
pub struct AsyncDbConnection {
    pool: Arc<Pool<SqliteConnectionManager>>,
}

impl AsyncDbConnection {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn lock(&self) -> Result<PooledConnection<SqliteConnectionManager>, r2d2::Error> {
        self.pool.get()
    }
}

pub struct Database {
    pub async_connection: AsyncDbConnection,
}

impl Database {
    /// Open the database and run migrations
    pub fn new(target: &DatabaseTarget) -> anyhow::Result<Self> {
        let pool = match target {
            DatabaseTarget::File(path) => Self::file_pool(path)?,
            DatabaseTarget::Memory => Self::memory_pool()?,
        };

        {
            let conn = pool.get()?;
            migrations::run_migrations(&conn)?;
        }

        Ok(Database {
            async_connection: AsyncDbConnection::new(pool),
        })
    }

    pub fn in_memory() -> anyhow::Result<Self> {
        Self::new(&DatabaseTarget::Memory)
    }

    fn file_pool(db_path: &Path) -> anyhow::Result<Pool<SqliteConnectionManager>> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
            conn.busy_timeout(Duration::from_secs(5))?;
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            register_functions(conn)
        });

        Ok(Pool::builder().max_size(8).build(manager)?)
    }

    // Every in-memory connection is its own database, so the pool is pinned
    // to a single connection that is never recycled.
    fn memory_pool() -> anyhow::Result<Pool<SqliteConnectionManager>> {
        let manager =
            SqliteConnectionManager::memory().with_init(|conn| register_functions(conn));

        Ok(Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?)
    }
}

/// SQL functions the queries rely on. `unicode_lower(text)` folds case
/// beyond ASCII, which the built-in `lower()` and `LIKE` do not.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|s| s.to_lowercase()))
        },
    )
}
