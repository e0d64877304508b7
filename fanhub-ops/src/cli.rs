//! Flags and setup shared by every binary

use anyhow::{Context, Result};
use clap::Args;
use std::io::{BufRead, Write};
use std::path::Path;

use fanhub_db::{Database, Settings};

use crate::error::OpsError;

#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to the SQLite database file (defaults to `database.path` from settings)
    #[arg(short, long, env = "DATABASE_PATH")]
    pub database: Option<String>,

    /// Skip the sleeps between batches
    #[arg(long)]
    pub no_throttle: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// The database path to use, preferring the flag over settings
    pub fn database_path(&self, settings: &Settings) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| settings.database.path.clone())
    }
}

/// Open an existing database and check that `required_tables` exist
pub fn open_database(path: &str, required_tables: &[&str]) -> Result<Database> {
    tracing::info!("Connecting to database: {}", path);

    if !Path::new(path).exists() {
        anyhow::bail!("Database file not found: {}", path);
    }

    let db = Database::new(path).context("Failed to open database connection")?;

    let missing = db
        .missing_tables(required_tables)
        .context("Failed to validate database schema")?;
    if !missing.is_empty() {
        return Err(OpsError::MissingTables(missing).into());
    }

    tracing::info!("Database connection successful - schema validated");
    Ok(db)
}

/// Ask a yes/no question on stdin; anything but `y`/`yes` means no
pub fn confirm(prompt: &str) -> Result<bool> {
    let stdin = std::io::stdin();
    confirm_from(prompt, &mut stdin.lock())
}

fn confirm_from<R: BufRead>(prompt: &str, input: &mut R) -> Result<bool> {
    print!("{} (y/N): ", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read user input")?;

    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_confirm_answers() {
        for (answer, expected) in [
            ("y\n", true),
            ("YES\n", true),
            ("  yes  \n", true),
            ("n\n", false),
            ("\n", false),
            ("", false),
            ("yep\n", false),
        ] {
            let mut input = Cursor::new(answer);
            assert_eq!(confirm_from("Continue?", &mut input).unwrap(), expected, "{:?}", answer);
        }
    }

    #[test]
    fn test_open_database_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.db");
        let err = open_database(path.to_str().unwrap(), &["users"])
            .err()
            .expect("missing file must be rejected");
        assert!(err.to_string().contains("Database file not found"));
    }

    #[test]
    fn test_open_database_validates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fanhub.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::new(path).unwrap();
            db.connection()
                .unwrap()
                .execute_batch("CREATE TABLE users (id TEXT PRIMARY KEY);")
                .unwrap();
        }

        let Err(err) = open_database(path, &["users", "posts", "likes"]) else {
            panic!("database without posts and likes must be rejected");
        };
        match err.downcast_ref::<OpsError>() {
            Some(OpsError::MissingTables(missing)) => {
                assert_eq!(missing, &vec!["posts".to_string(), "likes".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(open_database(path, &["users"]).is_ok());
    }

    #[test]
    fn test_database_flag_overrides_settings() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("settings.toml");
        std::fs::write(&file, "[database]\npath = \"from-settings.db\"\n").unwrap();
        let settings = Settings::from_file(&file).unwrap();

        let args = CommonArgs::default();
        assert_eq!(args.database_path(&settings), "from-settings.db");

        let args = CommonArgs {
            database: Some("flag.db".into()),
            ..CommonArgs::default()
        };
        assert_eq!(args.database_path(&settings), "flag.db");
    }
}
