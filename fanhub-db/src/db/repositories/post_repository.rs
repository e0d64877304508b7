use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;

use fanhub_types::{Media, Post, PostRef};

use crate::db::rows::{count_at, format_timestamp, timestamp_at};
use crate::db::DbPool;

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new post without attachments
    pub fn create(&self, post: &Post) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO posts (id, user_id, content, is_public, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                &post.id,
                &post.user_id,
                &post.content,
                if post.is_public { 1 } else { 0 },
                format_timestamp(&post.created_at),
            ),
        )
        .context("Failed to create post")?;
        Ok(())
    }

    /// Create the media row, the post and the attachment linking them
    pub fn create_with_media(&self, post: &Post, media: &Media) -> Result<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO media (id, url, type, created_at) VALUES (?, ?, ?, ?)",
            (
                &media.id,
                &media.url,
                media.media_type.as_str(),
                format_timestamp(&media.created_at),
            ),
        )
        .context("Failed to create media")?;
        tx.execute(
            "INSERT INTO posts (id, user_id, content, is_public, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                &post.id,
                &post.user_id,
                &post.content,
                if post.is_public { 1 } else { 0 },
                format_timestamp(&post.created_at),
            ),
        )
        .context("Failed to create post")?;
        tx.execute(
            "INSERT INTO attachments (post_id, media_id) VALUES (?, ?)",
            (&post.id, &media.id),
        )
        .context("Failed to attach media to post")?;

        tx.commit().context("Failed to commit post")?;
        Ok(())
    }

    /// Get post by ID
    pub fn get_by_id(&self, post_id: &str) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                "SELECT id, user_id, content, is_public, created_at FROM posts WHERE id = ?",
                [post_id],
                |row| {
                    Ok(Post {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        content: row.get(2)?,
                        is_public: row.get::<_, i32>(3)? == 1,
                        created_at: timestamp_at(row, 4)?,
                    })
                },
            )
            .optional()?;
        Ok(post)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| count_at(row, 0))?;
        Ok(count)
    }

    /// Page through post ids in id order
    ///
    /// Id order stays stable while `created_at` is being rewritten.
    pub fn page_ids(&self, offset: usize, limit: usize) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT id FROM posts ORDER BY id LIMIT ? OFFSET ?")?;
        let ids = stmt
            .query_map([limit as i64, offset as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Posts of a user with their like counts, oldest first
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<PostRef>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT p.id, (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id)
             FROM posts p
             WHERE p.user_id = ?
             ORDER BY p.created_at, p.id",
        )?;

        let posts = stmt
            .query_map([user_id], |row| {
                Ok(PostRef {
                    id: row.get(0)?,
                    like_count: count_at(row, 1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    /// Rewrite a post's creation time, returning whether the post existed
    pub fn update_created_at(&self, post_id: &str, created_at: &DateTime<Utc>) -> Result<bool> {
        let conn = self.pool.get()?;
        let updated = conn
            .execute(
                "UPDATE posts SET created_at = ? WHERE id = ?",
                [format_timestamp(created_at).as_str(), post_id],
            )
            .with_context(|| format!("Failed to update post {}", post_id))?;
        Ok(updated == 1)
    }
}
