use anyhow::{Context, Result};

use crate::db::rows::{count_at, now_timestamp};
use crate::db::DbPool;

pub struct LikeRepository {
    pool: DbPool,
}

impl LikeRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Like `post_id` as every user in `user_ids`, skipping existing likes
    pub fn create_many(&self, user_ids: &[String], post_id: &str) -> Result<usize> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction().context("Failed to begin like batch")?;
        let now = now_timestamp();
        let mut created = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES (?, ?, ?)",
            )?;
            for user_id in user_ids {
                created += stmt
                    .execute((user_id, post_id, &now))
                    .with_context(|| format!("Failed to like post {} as {}", post_id, user_id))?;
            }
        }
        tx.commit().context("Failed to commit like batch")?;
        Ok(created)
    }

    pub fn liker_ids(&self, post_id: &str) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT user_id FROM likes WHERE post_id = ?")?;
        let likers = stmt
            .query_map([post_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(likers)
    }

    pub fn like_count(&self, post_id: &str) -> Result<u64> {
        let conn = self.pool.get()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM likes WHERE post_id = ?",
            [post_id],
            |row| count_at(row, 0),
        )?;
        Ok(count)
    }
}
