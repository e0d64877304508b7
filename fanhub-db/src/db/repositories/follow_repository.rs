use anyhow::{Context, Result};

use crate::db::rows::{count_at, now_timestamp};
use crate::db::DbPool;

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Make every user in `follower_ids` follow `following_id`
    ///
    /// Existing follows are skipped. Returns the number of follows created.
    pub fn create_many(&self, follower_ids: &[String], following_id: &str) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction().context("Failed to begin follow batch")?;
        let now = now_timestamp();
        let mut created = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            )?;
            for follower_id in follower_ids {
                created += stmt
                    .execute((follower_id, following_id, &now))
                    .with_context(|| format!("Failed to follow {} as {}", following_id, follower_id))?;
            }
        }
        tx.commit().context("Failed to commit follow batch")?;
        Ok(created)
    }

    /// Get list of users that follow this user
    pub fn follower_ids(&self, user_id: &str) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT follower_id FROM follows WHERE following_id = ?")?;
        let followers = stmt
            .query_map([user_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(followers)
    }

    /// Get follower count
    pub fn follower_count(&self, user_id: &str) -> Result<u64> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM follows WHERE following_id = ?",
            [user_id],
            |row| count_at(row, 0),
        )?;
        Ok(count)
    }
}
