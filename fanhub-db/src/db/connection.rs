use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use super::schema::{SCHEMA, TEST_DATA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// In-memory databases are private to a single SQLite connection, so their
    /// pool holds exactly one connection.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let is_memory = Self::is_memory_path(path.as_ref());
        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path)
        }
        .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

        let builder = Pool::builder();
        let builder = if is_memory { builder.max_size(1) } else { builder };
        let pool = builder
            .build(manager)
            .context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    fn is_memory_path(path: &Path) -> bool {
        path.to_string_lossy()
            .trim()
            .eq_ignore_ascii_case(MEMORY_DB_PATH)
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        tracing::debug!("Database schema applied");
        Ok(())
    }

    /// Seed the database with fixture data
    pub fn seed_test_data(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(TEST_DATA)
            .context("Failed to seed test data")?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }

    /// Return the names in `required` that have no table in the database
    pub fn missing_tables(&self, required: &[&str]) -> Result<Vec<String>> {
        let conn = self.connection()?;
        let mut missing = Vec::new();
        for table in required {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name = ?",
                    [table],
                    |row| row.get(0),
                )
                .with_context(|| format!("Failed to check for {} table", table))?;
            if count == 0 {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_creation() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let conn = db.connection().expect("Failed to get connection");
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .expect("Failed to prepare statement");

        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .expect("Failed to query tables")
            .collect::<Result<Vec<_>, _>>()
            .expect("Failed to collect tables");

        for table in [
            "users",
            "posts",
            "media",
            "attachments",
            "follows",
            "likes",
            "bookmarks",
            "comments",
            "subscription_tiers",
            "subscriptions",
            "follower_meta",
        ] {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("first initialize");
        db.initialize().expect("second initialize");
        db.seed_test_data().expect("seed");
        db.seed_test_data().expect("seeding twice is ignored");
    }

    #[test]
    fn test_seed_test_data() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");
        db.seed_test_data().expect("Failed to seed test data");

        let conn = db.connection().expect("Failed to get connection");
        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .expect("Failed to count users");
        let posts: i64 = conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
            .expect("Failed to count posts");

        assert_eq!(users, 8);
        assert_eq!(posts, 5);
    }

    #[test]
    fn test_memory_database_detection() {
        for path in [":memory:", " :memory: ", ":MEMORY:", " :Memory: "] {
            let db = Database::new(path).expect("Failed to create memory database");
            db.initialize().expect("Failed to initialize schema");
            assert_eq!(db.pool.max_size(), 1);
        }

        let dir = tempfile::tempdir().expect("temp dir");
        let db = Database::new(dir.path().join("fanhub.db")).expect("Failed to create file database");
        db.initialize().expect("Failed to initialize file schema");
        assert!(dir.path().join("fanhub.db").exists());
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::in_memory().expect("Failed to create database");
        db.initialize().expect("Failed to initialize schema");

        let conn = db.connection().expect("Failed to get connection");
        let result = conn.execute(
            "INSERT INTO follows (follower_id, following_id, created_at) VALUES ('nobody', 'ghost', '2024-01-01T00:00:00.000Z')",
            [],
        );
        assert!(result.is_err(), "dangling follow should be rejected");
    }

    #[test]
    fn test_missing_tables() {
        let db = Database::in_memory().expect("Failed to create database");
        let missing = db.missing_tables(&["users", "posts"]).expect("check tables");
        assert_eq!(missing, vec!["users".to_string(), "posts".to_string()]);

        db.initialize().expect("Failed to initialize schema");
        let missing = db.missing_tables(&["users", "posts", "widgets"]).expect("check tables");
        assert_eq!(missing, vec!["widgets".to_string()]);
    }
}
