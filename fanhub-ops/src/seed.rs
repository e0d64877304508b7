//! Bulk creation of blank accounts that follow and like existing creators

use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;

use fanhub_db::db::repositories::{
    FollowRepository, FollowerMetaRepository, LikeRepository, PostRepository, UserRepository,
};
use fanhub_db::Database;
use fanhub_types::{Creator, User, VerificationStatus};

use crate::batch::BatchPlan;
use crate::engagement::{add_followers, add_likes, EngagementOptions, Goal};
use crate::generate::{
    in_range, platform_launch, random_email, random_instant, random_username, short_user_id,
};
use crate::pacing::Pause;
use crate::password::hash_password;

#[derive(Debug, Clone, Copy)]
pub struct SeedPacing {
    pub between_user_batches: Pause,
    pub between_follow_batches: Pause,
    pub between_like_batches: Pause,
    pub between_creators: Pause,
}

impl Default for SeedPacing {
    fn default() -> Self {
        Self {
            between_user_batches: Pause::secs(3),
            between_follow_batches: Pause::millis(500),
            between_like_batches: Pause::millis(200),
            between_creators: Pause::secs(1),
        }
    }
}

impl SeedPacing {
    pub fn none() -> Self {
        Self {
            between_user_batches: Pause::NONE,
            between_follow_batches: Pause::NONE,
            between_like_batches: Pause::NONE,
            between_creators: Pause::NONE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub total_users: usize,
    /// Users inserted per transaction
    pub batch_size: usize,
    /// Inclusive range of followers given to each creator
    pub followers: (u64, u64),
    /// Inclusive range of likes given to each post
    pub likes: (u64, u64),
    /// Follows or likes inserted per transaction
    pub insert_batch: usize,
    pub password: String,
    pub bcrypt_cost: u32,
    pub skip_engagement: bool,
    pub pacing: SeedPacing,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            total_users: 1_000_000,
            batch_size: 1000,
            followers: (500, 500_000),
            likes: (500, 500_000),
            insert_batch: 5000,
            password: "Trigun1!".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            skip_engagement: false,
            pacing: SeedPacing::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub creators_found: usize,
    pub users_created: usize,
    pub failed_user_batches: usize,
    pub creators_processed: usize,
    pub follows_created: u64,
    pub likes_created: u64,
    pub errors: Vec<String>,
}

impl SeedSummary {
    fn record_users(&mut self, created: usize) {
        self.users_created += created;
    }

    fn record_error(&mut self, error: String) {
        tracing::error!("{}", error);
        self.errors.push(error);
    }
}

/// Create the blank users, then attach follows and likes to every creator
pub fn run<R: Rng + ?Sized>(db: &Database, rng: &mut R, opts: &SeedOptions) -> Result<SeedSummary> {
    let users = UserRepository::new(db.pool.clone());
    let mut summary = SeedSummary::default();

    let creators = users.list_creators().context("Failed to list creators")?;
    summary.creators_found = creators.len();
    if creators.is_empty() {
        tracing::warn!("No users with posts found. Cannot proceed with follower/like creation.");
        return Ok(summary);
    }
    tracing::info!(
        "Found {} users with posts who will receive followers and likes",
        creators.len()
    );

    let password_hash = hash_password(&opts.password, opts.bcrypt_cost)?;
    let pool = create_users(&users, rng, opts, &password_hash, &mut summary);
    tracing::info!("Successfully created {} blank users", pool.len());

    if opts.skip_engagement {
        return Ok(summary);
    }

    let engagement = Engagement {
        follows: FollowRepository::new(db.pool.clone()),
        likes: LikeRepository::new(db.pool.clone()),
        posts: PostRepository::new(db.pool.clone()),
        meta: FollowerMetaRepository::new(db.pool.clone()),
    };

    for (index, creator) in creators.iter().enumerate() {
        engagement.process_creator(creator, rng, opts, &pool, &mut summary);
        summary.creators_processed += 1;
        if index + 1 < creators.len() {
            opts.pacing.between_creators.wait();
        }
    }

    Ok(summary)
}

fn create_users<R: Rng + ?Sized>(
    users: &UserRepository,
    rng: &mut R,
    opts: &SeedOptions,
    password_hash: &str,
    summary: &mut SeedSummary,
) -> Vec<String> {
    let plan = BatchPlan::new(opts.total_users, opts.batch_size);
    tracing::info!(
        "Will create users in {} batches of {} users each",
        plan.batch_count(),
        plan.batch_size
    );

    let start = platform_launch();
    let end = Utc::now();
    let mut pool = Vec::with_capacity(opts.total_users);

    for index in 0..plan.batch_count() {
        let batch: Vec<User> = (0..plan.batch_len(index))
            .map(|_| {
                let username = random_username(rng);
                User {
                    id: short_user_id(rng),
                    email: random_email(rng, &username),
                    display_name: Some(username.clone()),
                    username,
                    password_hash: password_hash.to_string(),
                    bio: None,
                    avatar_url: None,
                    banner_image_url: None,
                    is_verified: true,
                    verification_status: VerificationStatus::Approved,
                    created_at: random_instant(rng, start, end),
                }
            })
            .collect();

        match users.create_many(&batch) {
            Ok(ids) => {
                summary.record_users(ids.len());
                pool.extend(ids);
            }
            Err(e) => {
                summary.failed_user_batches += 1;
                summary.record_error(format!("Error creating user batch {}: {:#}", index + 1, e));
            }
        }

        tracing::info!(
            "Progress: {}/{} users created ({:.2}%)",
            pool.len(),
            opts.total_users,
            pool.len() as f64 / opts.total_users.max(1) as f64 * 100.0
        );

        if !plan.is_last(index) {
            opts.pacing.between_user_batches.wait();
        }
    }

    pool
}

struct Engagement {
    follows: FollowRepository,
    likes: LikeRepository,
    posts: PostRepository,
    meta: FollowerMetaRepository,
}

impl Engagement {
    fn process_creator<R: Rng + ?Sized>(
        &self,
        creator: &Creator,
        rng: &mut R,
        opts: &SeedOptions,
        pool: &[String],
        summary: &mut SeedSummary,
    ) {
        tracing::info!("Processing creator {} ({})", creator.username, creator.id);

        let follower_target = in_range(rng, opts.followers).min(pool.len() as u64);
        if let Err(e) = self.meta.upsert(&creator.id, follower_target) {
            summary.record_error(format!(
                "Error updating follower count for {}: {:#}",
                creator.username, e
            ));
        }

        let follow_opts = EngagementOptions {
            batch_size: opts.insert_batch,
            pause: opts.pacing.between_follow_batches,
        };
        match add_followers(&self.follows, rng, &creator.id, Goal::Add(follower_target), pool, &follow_opts) {
            Ok(outcome) => summary.follows_created += outcome.created,
            Err(e) => summary.record_error(format!(
                "Error creating follows for {}: {:#}",
                creator.username, e
            )),
        }

        let posts = match self.posts.list_for_user(&creator.id) {
            Ok(posts) => posts,
            Err(e) => {
                summary.record_error(format!("Error loading posts of {}: {:#}", creator.username, e));
                return;
            }
        };

        let like_opts = EngagementOptions {
            batch_size: opts.insert_batch,
            pause: opts.pacing.between_like_batches,
        };
        for post in &posts {
            let like_target = in_range(rng, opts.likes).min(pool.len() as u64);
            match add_likes(&self.likes, rng, &post.id, Goal::Add(like_target), pool, &like_opts) {
                Ok(outcome) => summary.likes_created += outcome.created,
                Err(e) => summary.record_error(format!("Error creating likes for post {}: {:#}", post.id, e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self as fixture, empty_db, rng, seeded_db};

    fn small_run() -> SeedOptions {
        SeedOptions {
            total_users: 10,
            batch_size: 4,
            followers: (3, 5),
            likes: (2, 4),
            insert_batch: 2,
            bcrypt_cost: 4,
            pacing: SeedPacing::none(),
            ..SeedOptions::default()
        }
    }

    #[test]
    fn test_defaults() {
        let opts = SeedOptions::default();
        assert_eq!(opts.total_users, 1_000_000);
        assert_eq!(opts.batch_size, 1000);
        assert_eq!(opts.followers, (500, 500_000));
        assert_eq!(opts.insert_batch, 5000);
        assert_eq!(opts.pacing.between_user_batches, Pause::secs(3));
    }

    #[test]
    fn test_seed_creates_users_and_engagement() {
        let db = seeded_db();
        let users = UserRepository::new(db.pool.clone());
        let follows = FollowRepository::new(db.pool.clone());
        let meta = FollowerMetaRepository::new(db.pool.clone());
        let before = users.count_all().unwrap();

        let summary = run(&db, &mut rng(11), &small_run()).unwrap();

        assert_eq!(summary.creators_found, 2);
        assert_eq!(summary.users_created, 10);
        assert_eq!(summary.creators_processed, 2);
        assert!(summary.errors.is_empty(), "{:?}", summary.errors);
        assert_eq!(users.count_all().unwrap(), before + 10);
        // Every new account is blank
        assert_eq!(users.count_blank().unwrap(), 4 + 10);

        for creator in [fixture::AVA, fixture::BEN] {
            let count = meta.get(creator).unwrap().expect("meta row").follower_count;
            assert!((3..=5).contains(&count));
        }
        // ben had no followers, so all of his come from this run
        let ben_followers = follows.follower_count(fixture::BEN).unwrap();
        assert_eq!(ben_followers, meta.get(fixture::BEN).unwrap().unwrap().follower_count);
        assert!(summary.follows_created >= 6);
        assert!(summary.likes_created >= 2 * 5);
    }

    #[test]
    fn test_stops_without_creators() {
        let db = empty_db();
        let summary = run(&db, &mut rng(12), &small_run()).unwrap();
        assert_eq!(summary.creators_found, 0);
        assert_eq!(summary.users_created, 0);
        assert_eq!(UserRepository::new(db.pool.clone()).count_all().unwrap(), 0);
    }

    #[test]
    fn test_skip_engagement() {
        let db = seeded_db();
        let opts = SeedOptions {
            skip_engagement: true,
            ..small_run()
        };
        let summary = run(&db, &mut rng(13), &opts).unwrap();
        assert_eq!(summary.users_created, 10);
        assert_eq!(summary.creators_processed, 0);
        assert_eq!(FollowRepository::new(db.pool.clone()).follower_count(fixture::BEN).unwrap(), 0);
    }

    #[test]
    fn test_password_hash_is_shared() {
        let db = seeded_db();
        let opts = SeedOptions {
            skip_engagement: true,
            total_users: 3,
            ..small_run()
        };
        run(&db, &mut rng(14), &opts).unwrap();

        let conn = db.connection().unwrap();
        let hashes: Vec<String> = conn
            .prepare("SELECT DISTINCT password_hash FROM users WHERE password_hash != 'x'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(hashes.len(), 1);
        assert!(bcrypt::verify("Trigun1!", &hashes[0]).unwrap());
    }
}
