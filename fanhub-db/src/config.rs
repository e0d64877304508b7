use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
    /// bcrypt work factor used for every generated password hash
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Seed {
    /// Shared password for synthetic blank accounts
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Import {
    pub password: String,
    pub downloads_dir: PathBuf,
    pub public_dir: PathBuf,
    pub upload_app_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: Database,
    pub security: Security,
    pub seed: Seed,
    pub import: Import,
}

/// Environment variables and the settings keys they override
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("DATABASE_PATH", "database.path"),
    ("BCRYPT_COST", "security.bcrypt_cost"),
    ("SEED_PASSWORD", "seed.password"),
    ("IMPORT_PASSWORD", "import.password"),
    ("DOWNLOADS_DIR", "import.downloads_dir"),
    ("PUBLIC_DIR", "import.public_dir"),
    ("UPLOAD_APP_ID", "import.upload_app_id"),
];

/// Older deployments only export the frontend's variable
const LEGACY_APP_ID_VAR: &str = "NEXT_PUBLIC_UPLOADTHING_APP_ID";

impl Settings {
    /// Load settings from `settings.toml` (if present) and the process environment
    pub fn new() -> Result<Self, ConfigError> {
        let mut builder = Self::defaults()?;

        // Check in current directory, then in the crate directory (for development)
        let config_file_name = "settings.toml";
        for candidate in [
            PathBuf::from(config_file_name),
            PathBuf::from("fanhub-ops").join(config_file_name),
        ] {
            if candidate.exists() {
                builder = builder.add_source(File::from(candidate).required(false));
            }
        }

        builder = Self::apply_env(builder, |key| std::env::var(key).ok())?;
        builder.build()?.try_deserialize()
    }

    /// Load settings from an explicit file without consulting the environment
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database.path", "fanhub.db")?
            .set_default("security.bcrypt_cost", 12)?
            .set_default("seed.password", "Trigun1!")?
            .set_default("import.password", "trigun1")?
            .set_default("import.downloads_dir", "downloads")?
            .set_default("import.public_dir", "public")?
            .set_default("import.upload_app_id", "local")
    }

    /// Apply environment overrides using `lookup` to read variables
    fn apply_env<F>(
        mut builder: ConfigBuilder<DefaultState>,
        lookup: F,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(app_id) = lookup(LEGACY_APP_ID_VAR) {
            builder = builder.set_override("import.upload_app_id", app_id)?;
        }
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup(var) {
                builder = builder.set_override(*key, value)?;
            }
        }
        Ok(builder)
    }
}
