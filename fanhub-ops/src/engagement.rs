//! Follow and like generation shared by the seeding jobs

use anyhow::{Context, Result};
use rand::Rng;
use std::collections::HashSet;

use fanhub_db::db::repositories::{FollowRepository, LikeRepository};

use crate::batch::BatchPlan;
use crate::generate::sample_ids;
use crate::pacing::Pause;

/// How many rows a run should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Goal {
    /// Create this many new rows on top of what exists
    Add(u64),
    /// Top up until this many rows exist
    ReachTotal(u64),
}

impl Goal {
    pub fn needed(&self, existing: u64) -> u64 {
        match *self {
            Goal::Add(n) => n,
            Goal::ReachTotal(n) => n.saturating_sub(existing),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EngagementOptions {
    pub batch_size: usize,
    /// Sleep between insert batches, not after the last one
    pub pause: Pause,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub existing: u64,
    pub created: u64,
    pub failed_batches: usize,
}

impl Outcome {
    pub fn total(&self) -> u64 {
        self.existing + self.created
    }
}

/// Make users from `pool` follow `user_id` until `goal` is met
pub fn add_followers<R: Rng + ?Sized>(
    follows: &FollowRepository,
    rng: &mut R,
    user_id: &str,
    goal: Goal,
    pool: &[String],
    opts: &EngagementOptions,
) -> Result<Outcome> {
    let existing = follows
        .follower_ids(user_id)
        .with_context(|| format!("Failed to load followers of {}", user_id))?;

    Ok(engage(
        rng,
        &existing,
        Some(user_id),
        goal,
        pool,
        opts,
        "follows",
        |batch| follows.create_many(batch, user_id),
    ))
}

/// Make users from `pool` like `post_id` until `goal` is met
pub fn add_likes<R: Rng + ?Sized>(
    likes: &LikeRepository,
    rng: &mut R,
    post_id: &str,
    goal: Goal,
    pool: &[String],
    opts: &EngagementOptions,
) -> Result<Outcome> {
    let existing = likes
        .liker_ids(post_id)
        .with_context(|| format!("Failed to load likes of post {}", post_id))?;

    Ok(engage(
        rng,
        &existing,
        None,
        goal,
        pool,
        opts,
        "likes",
        |batch| likes.create_many(batch, post_id),
    ))
}

#[allow(clippy::too_many_arguments)]
fn engage<R, F>(
    rng: &mut R,
    existing: &[String],
    exclude: Option<&str>,
    goal: Goal,
    pool: &[String],
    opts: &EngagementOptions,
    kind: &str,
    mut insert: F,
) -> Outcome
where
    R: Rng + ?Sized,
    F: FnMut(&[String]) -> Result<usize>,
{
    let mut outcome = Outcome {
        existing: existing.len() as u64,
        ..Outcome::default()
    };

    let needed = goal.needed(outcome.existing);
    if needed == 0 {
        tracing::debug!("Already has {} {}, nothing to add", outcome.existing, kind);
        return outcome;
    }

    let taken: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let candidates: Vec<String> = pool
        .iter()
        .filter(|id| !taken.contains(id.as_str()) && Some(id.as_str()) != exclude)
        .cloned()
        .collect();

    let wanted = usize::try_from(needed).unwrap_or(usize::MAX);
    let selected = sample_ids(rng, &candidates, wanted);
    if selected.len() < wanted {
        tracing::warn!(
            "Only {} candidate users available for {} more {}",
            selected.len(),
            needed,
            kind
        );
    }
    if selected.is_empty() {
        return outcome;
    }

    let plan = BatchPlan::new(selected.len(), opts.batch_size);
    for (index, batch) in selected.chunks(plan.batch_size).enumerate() {
        match insert(batch) {
            Ok(created) => {
                outcome.created += created as u64;
                tracing::debug!(
                    "Batch {}/{}: created {} {}",
                    index + 1,
                    plan.batch_count(),
                    created,
                    kind
                );
            }
            Err(e) => {
                outcome.failed_batches += 1;
                tracing::error!("Error creating {} batch {}: {:#}", kind, index + 1, e);
            }
        }

        if !plan.is_last(index) {
            opts.pause.wait();
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self as fixture, rng, seeded_db};

    fn opts(batch_size: usize) -> EngagementOptions {
        EngagementOptions {
            batch_size,
            pause: Pause::NONE,
        }
    }

    fn pool() -> Vec<String> {
        let mut ids: Vec<String> = fixture::BLANK_USERS.iter().map(|s| s.to_string()).collect();
        ids.push(fixture::DAN.to_string());
        ids.push(fixture::AVA.to_string());
        ids
    }

    #[test]
    fn test_goal_needed() {
        assert_eq!(Goal::Add(5).needed(100), 5);
        assert_eq!(Goal::ReachTotal(5).needed(2), 3);
        assert_eq!(Goal::ReachTotal(5).needed(9), 0);
    }

    #[test]
    fn test_reach_total_tops_up() {
        let db = seeded_db();
        let follows = FollowRepository::new(db.pool.clone());
        let mut rng = rng(7);

        // ava starts with cara and blank_a
        let outcome = add_followers(&follows, &mut rng, fixture::AVA, Goal::ReachTotal(4), &pool(), &opts(1))
            .unwrap();
        assert_eq!(outcome.existing, 2);
        assert_eq!(outcome.created, 2);
        assert_eq!(outcome.total(), 4);
        assert_eq!(follows.follower_count(fixture::AVA).unwrap(), 4);

        let again = add_followers(&follows, &mut rng, fixture::AVA, Goal::ReachTotal(4), &pool(), &opts(1))
            .unwrap();
        assert_eq!(again.created, 0);
    }

    #[test]
    fn test_target_never_follows_itself() {
        let db = seeded_db();
        let follows = FollowRepository::new(db.pool.clone());
        let mut rng = rng(8);

        let outcome =
            add_followers(&follows, &mut rng, fixture::AVA, Goal::Add(100), &pool(), &opts(2)).unwrap();
        // pool of 6 minus ava herself minus blank_a who already follows
        assert_eq!(outcome.created, 4);
        assert!(!follows.follower_ids(fixture::AVA).unwrap().contains(&fixture::AVA.to_string()));
    }

    #[test]
    fn test_add_likes_skips_existing_likers() {
        let db = seeded_db();
        let likes = LikeRepository::new(db.pool.clone());
        let mut rng = rng(9);
        let post = fixture::AVA_POSTS[0];

        let outcome = add_likes(&likes, &mut rng, post, Goal::Add(10), &pool(), &opts(100)).unwrap();
        // blank_a and dan already like the post
        assert_eq!(outcome.existing, 2);
        assert_eq!(outcome.created, 4);
        assert_eq!(likes.like_count(post).unwrap(), 6);
    }

    #[test]
    fn test_failed_batch_is_counted_and_skipped() {
        let mut rng = rng(10);
        let pool: Vec<String> = (0..10).map(|i| format!("u{}", i)).collect();
        let mut calls = 0;
        let outcome = engage(&mut rng, &[], None, Goal::Add(10), &pool, &opts(3), "likes", |batch| {
            calls += 1;
            if calls == 2 {
                anyhow::bail!("disk I/O error");
            }
            Ok(batch.len())
        });

        assert_eq!(calls, 4);
        assert_eq!(outcome.failed_batches, 1);
        assert_eq!(outcome.created, 7);
    }
}
