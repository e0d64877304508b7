//! Batch maintenance jobs for the FanHub database
//!
//! Each job module exposes an options struct, a `run` function and a summary.
//! The binaries under `src/bin` only parse flags, load settings and print.

pub mod batch;
pub mod cli;
pub mod engagement;
pub mod error;
pub mod generate;
pub mod logging;
pub mod pacing;
pub mod password;
pub mod retry;

pub mod cleanup;
pub mod follow_like;
pub mod import;
pub mod randomize;
pub mod report;
pub mod seed;

pub use error::OpsError;

#[cfg(test)]
pub(crate) mod test_support {
    pub use fanhub_db::db::schema::fixture::*;

    use fanhub_db::Database;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub fn seeded_db() -> Database {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        db.seed_test_data().expect("Failed to seed test data");
        db
    }

    pub fn empty_db() -> Database {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize schema");
        db
    }

    pub fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }
}
