// Library exports for fanhub-db
// Shared by every maintenance binary in fanhub-ops

pub mod config;
pub mod db;

pub use config::Settings;
pub use db::{Database, DbPool};
