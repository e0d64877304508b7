use anyhow::{Context, Result};
use rusqlite::OptionalExtension;

use fanhub_types::FollowerMeta;

use crate::db::rows::{count_at, now_timestamp, timestamp_at};
use crate::db::DbPool;

/// Denormalised follower counts displayed on profiles
pub struct FollowerMetaRepository {
    pool: DbPool,
}

impl FollowerMetaRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert or update the follower count for a user
    pub fn upsert(&self, user_id: &str, follower_count: u64) -> Result<()> {
        let conn = self.pool.get()?;
        let now = now_timestamp();
        conn.execute(
            "INSERT INTO follower_meta (user_id, follower_count, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT (user_id)
             DO UPDATE SET follower_count = excluded.follower_count, updated_at = excluded.updated_at",
            (user_id, follower_count as i64, &now),
        )
        .with_context(|| format!("Failed to store follower count for user {}", user_id))?;
        Ok(())
    }

    pub fn get(&self, user_id: &str) -> Result<Option<FollowerMeta>> {
        let conn = self.pool.get()?;
        let meta = conn
            .query_row(
                "SELECT user_id, follower_count, created_at, updated_at FROM follower_meta WHERE user_id = ?",
                [user_id],
                |row| {
                    Ok(FollowerMeta {
                        user_id: row.get(0)?,
                        follower_count: count_at(row, 1)?,
                        created_at: timestamp_at(row, 2)?,
                        updated_at: timestamp_at(row, 3)?,
                    })
                },
            )
            .optional()?;
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::fixture::{self, seeded_db};

    #[test]
    fn test_upsert_updates_existing_row() {
        let db = seeded_db();
        let repo = FollowerMetaRepository::new(db.pool.clone());

        let before = repo.get(fixture::AVA).unwrap().expect("fixture meta");
        assert_eq!(before.follower_count, 1200);

        repo.upsert(fixture::AVA, 345_678).expect("upsert");
        let after = repo.get(fixture::AVA).unwrap().unwrap();
        assert_eq!(after.follower_count, 345_678);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[test]
    fn test_upsert_inserts_new_row() {
        let db = seeded_db();
        let repo = FollowerMetaRepository::new(db.pool.clone());

        assert!(repo.get(fixture::BEN).unwrap().is_none());
        repo.upsert(fixture::BEN, 64).unwrap();
        let meta = repo.get(fixture::BEN).unwrap().unwrap();
        assert_eq!(meta.follower_count, 64);
        assert_eq!(meta.created_at, meta.updated_at);
    }

    #[test]
    fn test_upsert_unknown_user_fails() {
        let db = seeded_db();
        let repo = FollowerMetaRepository::new(db.pool.clone());
        assert!(repo.upsert("ghost", 10).is_err());
    }
}
