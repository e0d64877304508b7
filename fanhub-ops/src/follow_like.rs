//! Tops creators up to a moderate number of followers and likes

use anyhow::{Context, Result};
use rand::Rng;

use fanhub_db::db::repositories::{
    FollowRepository, FollowerMetaRepository, LikeRepository, PostRepository, UserRepository,
};
use fanhub_db::Database;
use fanhub_types::Creator;

use crate::engagement::{add_followers, add_likes, EngagementOptions, Goal};
use crate::error::OpsError;
use crate::generate::in_range;
use crate::pacing::Pause;

/// Tables this job reads or writes
pub const REQUIRED_TABLES: [&str; 4] = ["users", "posts", "follows", "likes"];

#[derive(Debug, Clone, Copy)]
pub struct FollowLikePacing {
    pub between_follow_batches: Pause,
    pub between_like_batches: Pause,
    pub between_posts: Pause,
    pub between_creators: Pause,
}

impl Default for FollowLikePacing {
    fn default() -> Self {
        Self {
            between_follow_batches: Pause::millis(500),
            between_like_batches: Pause::millis(300),
            between_posts: Pause::millis(500),
            between_creators: Pause::secs(1),
        }
    }
}

impl FollowLikePacing {
    pub fn none() -> Self {
        Self {
            between_follow_batches: Pause::NONE,
            between_like_batches: Pause::NONE,
            between_posts: Pause::NONE,
            between_creators: Pause::NONE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FollowLikeOptions {
    /// Inclusive follower target range per creator
    pub followers: (u64, u64),
    /// Inclusive like target range per post
    pub likes: (u64, u64),
    pub batch_size: usize,
    /// Maximum number of post-less users loaded as the follower pool
    pub pool_limit: usize,
    pub pacing: FollowLikePacing,
}

impl Default for FollowLikeOptions {
    fn default() -> Self {
        Self {
            followers: (50, 100),
            likes: (30, 100),
            batch_size: 100,
            pool_limit: 10_000,
            pacing: FollowLikePacing::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct FollowLikeSummary {
    pub creators_found: usize,
    pub pool_size: usize,
    pub creators_processed: usize,
    pub follows_created: u64,
    pub likes_created: u64,
    pub errors: Vec<String>,
}

impl FollowLikeSummary {
    fn record_error(&mut self, error: String) {
        tracing::error!("{}", error);
        self.errors.push(error);
    }
}

pub fn run<R: Rng + ?Sized>(
    db: &Database,
    rng: &mut R,
    opts: &FollowLikeOptions,
) -> Result<FollowLikeSummary> {
    let missing = db.missing_tables(&REQUIRED_TABLES)?;
    if !missing.is_empty() {
        return Err(OpsError::MissingTables(missing).into());
    }

    let users = UserRepository::new(db.pool.clone());
    let mut summary = FollowLikeSummary::default();

    let creators = users.list_creators().context("Failed to list creators")?;
    summary.creators_found = creators.len();
    if creators.is_empty() {
        tracing::warn!("No users with posts found. Cannot proceed.");
        return Ok(summary);
    }
    tracing::info!(
        "Found {} users with posts who will receive followers and likes",
        creators.len()
    );

    let pool = users
        .list_without_posts(opts.pool_limit)
        .context("Failed to load users without posts")?;
    summary.pool_size = pool.len();
    if pool.is_empty() {
        tracing::warn!("No blank users found. Cannot proceed.");
        return Ok(summary);
    }
    tracing::info!("Will use {} blank users as followers and likers", pool.len());

    let job = TopUp {
        follows: FollowRepository::new(db.pool.clone()),
        likes: LikeRepository::new(db.pool.clone()),
        posts: PostRepository::new(db.pool.clone()),
        meta: FollowerMetaRepository::new(db.pool.clone()),
        opts,
    };

    for (index, creator) in creators.iter().enumerate() {
        tracing::info!(
            "Processing user {} ({}): {} posts, {} followers",
            creator.username,
            creator.id,
            creator.post_count,
            creator.follower_count
        );
        job.follow_creator(creator, rng, &pool, &mut summary);
        job.like_posts(creator, rng, &pool, &mut summary);
        summary.creators_processed += 1;

        if index + 1 < creators.len() {
            opts.pacing.between_creators.wait();
        }
    }

    Ok(summary)
}

struct TopUp<'a> {
    follows: FollowRepository,
    likes: LikeRepository,
    posts: PostRepository,
    meta: FollowerMetaRepository,
    opts: &'a FollowLikeOptions,
}

impl TopUp<'_> {
    fn follow_creator<R: Rng + ?Sized>(
        &self,
        creator: &Creator,
        rng: &mut R,
        pool: &[String],
        summary: &mut FollowLikeSummary,
    ) {
        let desired = in_range(rng, self.opts.followers);
        let follow_opts = EngagementOptions {
            batch_size: self.opts.batch_size,
            pause: self.opts.pacing.between_follow_batches,
        };

        let outcome = match add_followers(&self.follows, rng, &creator.id, Goal::ReachTotal(desired), pool, &follow_opts) {
            Ok(outcome) => outcome,
            Err(e) => {
                summary.record_error(format!("Failed to create follows for user {}: {:#}", creator.id, e));
                return;
            }
        };
        summary.follows_created += outcome.created;
        tracing::info!(
            "{} now has {} followers ({} new)",
            creator.username,
            outcome.total(),
            outcome.created
        );

        if let Err(e) = self.meta.upsert(&creator.id, outcome.total()) {
            summary.record_error(format!(
                "Failed to update follower count for user {}: {:#}",
                creator.id, e
            ));
        }
    }

    fn like_posts<R: Rng + ?Sized>(
        &self,
        creator: &Creator,
        rng: &mut R,
        pool: &[String],
        summary: &mut FollowLikeSummary,
    ) {
        let posts = match self.posts.list_for_user(&creator.id) {
            Ok(posts) => posts,
            Err(e) => {
                summary.record_error(format!("Failed to create likes for user {}: {:#}", creator.id, e));
                return;
            }
        };

        let like_opts = EngagementOptions {
            batch_size: self.opts.batch_size,
            pause: self.opts.pacing.between_like_batches,
        };
        let mut created = 0;
        for (index, post) in posts.iter().enumerate() {
            let desired = in_range(rng, self.opts.likes);
            match add_likes(&self.likes, rng, &post.id, Goal::ReachTotal(desired), pool, &like_opts) {
                Ok(outcome) => created += outcome.created,
                Err(e) => summary.record_error(format!("Failed to create likes for post {}: {:#}", post.id, e)),
            }
            if index + 1 < posts.len() {
                self.opts.pacing.between_posts.wait();
            }
        }

        summary.likes_created += created;
        tracing::info!("Created {} likes on {}'s posts", created, creator.username);
    }
}
