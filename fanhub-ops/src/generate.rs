//! Random usernames, emails, ids and dates for synthetic data

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::{Builder, Uuid};

const ADJECTIVES: [&str; 24] = [
    "happy", "brave", "creative", "swift", "clever", "bright", "mighty", "calm", "wise", "great",
    "bold", "fancy", "magical", "super", "jolly", "wild", "fierce", "gentle", "smart", "kind",
    "smooth", "shiny", "quick", "silent",
];

const NOUNS: [&str; 24] = [
    "tiger", "dragon", "panda", "fox", "wolf", "eagle", "lion", "dolphin", "hero", "ninja",
    "wizard", "knight", "runner", "dancer", "gamer", "coder", "writer", "artist", "ranger",
    "pilot", "singer", "agent", "racer", "chef",
];

const EMAIL_DOMAINS: [&str; 5] = [
    "gmail.com",
    "outlook.com",
    "yahoo.com",
    "hotmail.com",
    "protonmail.com",
];

/// Length of the compact ids used for user rows
pub const USER_ID_LEN: usize = 20;

const SECONDS_PER_DAY: i64 = 86_400;

/// Earliest join date handed out to generated accounts
pub fn platform_launch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Adjective + noun + number, e.g. `braveotter42`
pub fn random_username<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("happy");
    let noun = NOUNS.choose(rng).copied().unwrap_or("fox");
    format!("{}{}{}", adjective, noun, rng.gen_range(0..=9999))
}

pub fn random_email<R: Rng + ?Sized>(rng: &mut R, username: &str) -> String {
    let local: String = username
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let domain = EMAIL_DOMAINS.choose(rng).copied().unwrap_or("gmail.com");
    format!("{}{}@{}", local, rng.gen_range(1000..=9999), domain)
}

/// Random v4 uuid drawn from `rng`
pub fn new_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

/// 20 lowercase hex characters
pub fn short_user_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut id = new_id(rng).simple().to_string();
    id.truncate(USER_ID_LEN);
    id
}

/// Uniform whole second in `[start, end]`
pub fn random_instant<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let span = (end - start).num_seconds();
    if span <= 0 {
        return start;
    }
    start + Duration::seconds(rng.gen_range(0..=span))
}

/// A random day in the window plus a random time of day, never past `end`
pub fn random_day_and_time<R: Rng + ?Sized>(
    rng: &mut R,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> DateTime<Utc> {
    let days = (end - start).num_days();
    if days < 0 {
        return start;
    }
    let day = rng.gen_range(0..=days);
    let second = rng.gen_range(0..SECONDS_PER_DAY);
    let candidate = start + Duration::days(day) + Duration::seconds(second);
    candidate.min(end)
}

/// `min(n, pool.len())` distinct elements chosen uniformly
pub fn sample_ids<R: Rng + ?Sized>(rng: &mut R, pool: &[String], n: usize) -> Vec<String> {
    let amount = n.min(pool.len());
    rand::seq::index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect()
}

/// Uniform draw from an inclusive range given as `(min, max)`
pub fn in_range<R: Rng + ?Sized>(rng: &mut R, (min, max): (u64, u64)) -> u64 {
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_username_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let name = random_username(&mut rng);
            let adjective = ADJECTIVES.iter().find(|a| name.starts_with(*a)).expect("adjective");
            let rest = &name[adjective.len()..];
            let noun = NOUNS.iter().find(|n| rest.starts_with(*n)).expect("noun");
            let number: u32 = rest[noun.len()..].parse().expect("numeric suffix");
            assert!(number <= 9999);
        }
    }

    #[test]
    fn test_email_sanitises_username() {
        let mut rng = StdRng::seed_from_u64(2);
        let email = random_email(&mut rng, "Ava_Ray.99");
        let (local, domain) = email.split_once('@').unwrap();
        assert!(local.starts_with("avaray99"));
        let suffix: u32 = local["avaray99".len()..].parse().unwrap();
        assert!((1000..=9999).contains(&suffix));
        assert!(EMAIL_DOMAINS.contains(&domain));
    }

    #[test]
    fn test_short_user_id() {
        let mut rng = StdRng::seed_from_u64(3);
        let ids: HashSet<String> = (0..100).map(|_| short_user_id(&mut rng)).collect();
        assert_eq!(ids.len(), 100);
        for id in &ids {
            assert_eq!(id.len(), USER_ID_LEN);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_new_id_is_v4() {
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(new_id(&mut rng).get_version_num(), 4);
    }

    #[test]
    fn test_sample_ids_caps_at_pool() {
        let mut rng = StdRng::seed_from_u64(5);
        let pool: Vec<String> = (0..5).map(|i| format!("u{}", i)).collect();
        let picked = sample_ids(&mut rng, &pool, 10);
        assert_eq!(picked.len(), 5);
        assert!(sample_ids(&mut rng, &[], 3).is_empty());
    }

    #[test]
    fn test_degenerate_windows() {
        let mut rng = StdRng::seed_from_u64(6);
        let start = platform_launch();
        assert_eq!(random_instant(&mut rng, start, start), start);
        let before = start - Duration::days(1);
        assert_eq!(random_day_and_time(&mut rng, start, before), start);
        assert_eq!(in_range(&mut rng, (9, 3)), 9);
    }

    proptest! {
        #[test]
        fn prop_random_instant_in_window(seed: u64, span in 0i64..10_000_000) {
            let mut rng = StdRng::seed_from_u64(seed);
            let start = platform_launch();
            let end = start + Duration::seconds(span);
            let t = random_instant(&mut rng, start, end);
            prop_assert!(t >= start && t <= end);
        }

        #[test]
        fn prop_random_day_and_time_in_window(seed: u64, span in 0i64..100_000_000) {
            let mut rng = StdRng::seed_from_u64(seed);
            let start = platform_launch();
            let end = start + Duration::seconds(span);
            let t = random_day_and_time(&mut rng, start, end);
            prop_assert!(t >= start && t <= end);
        }

        #[test]
        fn prop_sample_ids_distinct(seed: u64, len in 0usize..200, n in 0usize..300) {
            let mut rng = StdRng::seed_from_u64(seed);
            let pool: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let picked = sample_ids(&mut rng, &pool, n);
            prop_assert_eq!(picked.len(), n.min(len));
            let distinct: HashSet<&String> = picked.iter().collect();
            prop_assert_eq!(distinct.len(), picked.len());
        }
    }
}
