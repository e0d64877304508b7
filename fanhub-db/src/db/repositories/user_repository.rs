use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use fanhub_types::{Creator, PostCountBucket, PostRange, User, UserSummary};

use crate::db::rows::{count_at, format_timestamp, timestamp_at, user_from_row, USER_COLUMNS};
use crate::db::DbPool;

/// A blank user has no posts, no avatar and an empty bio
const BLANK_FILTER: &str = "NOT EXISTS (SELECT 1 FROM posts p WHERE p.user_id = users.id)
     AND users.avatar_url IS NULL
     AND (users.bio IS NULL OR users.bio = '')";

const INSERT_USER: &str = "INSERT OR IGNORE INTO users (id, username, display_name, email, password_hash, bio,
        avatar_url, banner_image_url, is_verified, verification_status, created_at)
     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a single user, failing if the id, username or email is taken
    pub fn create(&self, user: &User) -> Result<()> {
        let conn = self.pool.get()?;
        let inserted = conn
            .execute(INSERT_USER, user_params(user))
            .context("Failed to create user")?;
        if inserted == 0 {
            anyhow::bail!("User {} or email {} already exists", user.username, user.email);
        }
        Ok(())
    }

    /// Insert users in one transaction, skipping duplicates
    ///
    /// Returns the ids of the rows that were actually inserted.
    pub fn create_many(&self, users: &[User]) -> Result<Vec<String>> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction().context("Failed to begin user batch")?;
        let mut inserted = Vec::with_capacity(users.len());
        {
            let mut stmt = tx.prepare(INSERT_USER)?;
            for user in users {
                if stmt.execute(user_params(user))? == 1 {
                    inserted.push(user.id.clone());
                }
            }
        }
        tx.commit().context("Failed to commit user batch")?;
        Ok(inserted)
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
                [user_id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Find a user whose username or email matches, ignoring case
    pub fn find_by_username_or_email(&self, username: &str, email: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} FROM users
                     WHERE username = ?1 COLLATE NOCASE OR email = ?2 COLLATE NOCASE
                     ORDER BY created_at
                     LIMIT 1",
                    USER_COLUMNS
                ),
                [username, email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Set avatar and banner image URLs
    pub fn update_images(&self, user_id: &str, avatar_url: &str, banner_url: &str) -> Result<()> {
        let conn = self.pool.get()?;
        let updated = conn
            .execute(
                "UPDATE users SET avatar_url = ?, banner_image_url = ? WHERE id = ?",
                [avatar_url, banner_url, user_id],
            )
            .context("Failed to update user images")?;
        if updated == 0 {
            anyhow::bail!("User {} not found", user_id);
        }
        Ok(())
    }

    /// Users with at least one post, oldest account first
    pub fn list_creators(&self) -> Result<Vec<Creator>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT u.id, u.username,
                    (SELECT COUNT(*) FROM posts p WHERE p.user_id = u.id) AS post_count,
                    (SELECT COUNT(*) FROM follows f WHERE f.following_id = u.id) AS follower_count
             FROM users u
             WHERE EXISTS (SELECT 1 FROM posts p WHERE p.user_id = u.id)
             ORDER BY u.created_at, u.id",
        )?;

        let creators = stmt
            .query_map([], |row| {
                Ok(Creator {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    post_count: count_at(row, 2)?,
                    follower_count: count_at(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(creators)
    }

    /// Ids of up to `limit` users without any posts
    pub fn list_without_posts(&self, limit: usize) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM users
             WHERE NOT EXISTS (SELECT 1 FROM posts p WHERE p.user_id = users.id)
             ORDER BY created_at, id
             LIMIT ?",
        )?;

        let ids = stmt
            .query_map([limit as i64], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(ids)
    }

    pub fn count_all(&self) -> Result<u64> {
        self.count_where("1 = 1")
    }

    pub fn count_without_posts(&self) -> Result<u64> {
        self.count_where("NOT EXISTS (SELECT 1 FROM posts p WHERE p.user_id = users.id)")
    }

    pub fn count_without_avatar(&self) -> Result<u64> {
        self.count_where("avatar_url IS NULL")
    }

    pub fn count_without_bio(&self) -> Result<u64> {
        self.count_where("bio IS NULL OR bio = ''")
    }

    /// Count completely blank users (no posts, no avatar, no bio)
    pub fn count_blank(&self) -> Result<u64> {
        self.count_where(BLANK_FILTER)
    }

    fn count_where(&self, filter: &str) -> Result<u64> {
        let conn = self.pool.get()?;
        let count = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM users WHERE {}", filter),
                [],
                |row| count_at(row, 0),
            )
            .context("Failed to count users")?;
        Ok(count)
    }

    /// Page through completely blank users in a stable order
    pub fn find_blank(&self, offset: usize, limit: usize) -> Result<Vec<UserSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, username, display_name, created_at FROM users
             WHERE {}
             ORDER BY created_at, id
             LIMIT ? OFFSET ?",
            BLANK_FILTER
        ))?;

        let users = stmt
            .query_map([limit as i64, offset as i64], |row| {
                Ok(UserSummary {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    display_name: row.get(2)?,
                    created_at: timestamp_at(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Number of users in every post-count range, including empty ranges
    pub fn post_count_distribution(&self) -> Result<Vec<PostCountBucket>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT post_count, COUNT(*) FROM (
                 SELECT (SELECT COUNT(*) FROM posts p WHERE p.user_id = u.id) AS post_count
                 FROM users u
             )
             GROUP BY post_count",
        )?;

        let mut buckets: Vec<PostCountBucket> = PostRange::ALL
            .iter()
            .map(|range| PostCountBucket {
                range: *range,
                user_count: 0,
            })
            .collect();

        let rows = stmt.query_map([], |row| Ok((count_at(row, 0)?, count_at(row, 1)?)))?;
        for row in rows {
            let (post_count, users) = row?;
            let range = PostRange::classify(post_count);
            if let Some(bucket) = buckets.iter_mut().find(|b| b.range == range) {
                bucket.user_count += users;
            }
        }

        Ok(buckets)
    }

    /// Delete a user and every row that references them, atomically
    ///
    /// Returns `false` when no user with this id existed.
    pub fn delete_with_related(&self, user_id: &str) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn
            .transaction()
            .context("Failed to begin user deletion")?;

        const OWN_POSTS: &str = "SELECT id FROM posts WHERE user_id = ?1";
        const OWN_TIERS: &str = "SELECT id FROM subscription_tiers WHERE creator_id = ?1";

        let steps: [(&str, String); 12] = [
            ("follows", "DELETE FROM follows WHERE follower_id = ?1 OR following_id = ?1".into()),
            ("likes", "DELETE FROM likes WHERE user_id = ?1".into()),
            ("bookmarks", "DELETE FROM bookmarks WHERE user_id = ?1".into()),
            ("comments", "DELETE FROM comments WHERE user_id = ?1".into()),
            ("likes on posts", format!("DELETE FROM likes WHERE post_id IN ({})", OWN_POSTS)),
            ("bookmarks on posts", format!("DELETE FROM bookmarks WHERE post_id IN ({})", OWN_POSTS)),
            ("comments on posts", format!("DELETE FROM comments WHERE post_id IN ({})", OWN_POSTS)),
            ("attachments", format!("DELETE FROM attachments WHERE post_id IN ({})", OWN_POSTS)),
            ("posts", "DELETE FROM posts WHERE user_id = ?1".into()),
            ("tier subscriptions", format!("DELETE FROM subscriptions WHERE tier_id IN ({})", OWN_TIERS)),
            ("tiers", "DELETE FROM subscription_tiers WHERE creator_id = ?1".into()),
            ("subscriptions", "DELETE FROM subscriptions WHERE subscriber_id = ?1".into()),
        ];

        for (what, sql) in &steps {
            let removed = tx
                .execute(sql, params![user_id])
                .with_context(|| format!("Failed to delete {} for user {}", what, user_id))?;
            if removed > 0 {
                tracing::debug!("Removed {} {} for user {}", removed, what, user_id);
            }
        }

        tx.execute("DELETE FROM follower_meta WHERE user_id = ?1", params![user_id])
            .with_context(|| format!("Failed to delete metadata for user {}", user_id))?;
        let deleted = tx
            .execute("DELETE FROM users WHERE id = ?1", params![user_id])
            .with_context(|| format!("Failed to delete user {}", user_id))?;

        tx.commit().context("Failed to commit user deletion")?;
        Ok(deleted == 1)
    }
}

fn user_params(user: &User) -> impl rusqlite::Params + '_ {
    (
        &user.id,
        &user.username,
        &user.display_name,
        &user.email,
        &user.password_hash,
        &user.bio,
        &user.avatar_url,
        &user.banner_image_url,
        if user.is_verified { 1 } else { 0 },
        user.verification_status.as_str(),
        format_timestamp(&user.created_at),
    )
}
