/// SQL schema for the FanHub database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE COLLATE NOCASE,
    display_name TEXT,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    bio TEXT,
    avatar_url TEXT,
    banner_image_url TEXT,
    is_verified INTEGER NOT NULL DEFAULT 0,
    verification_status TEXT NOT NULL DEFAULT 'PENDING'
        CHECK(verification_status IN ('PENDING', 'APPROVED', 'REJECTED')),
    created_at TEXT NOT NULL
);

-- Posts table
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    content TEXT NOT NULL DEFAULT '',
    is_public INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_posts_user_id ON posts(user_id);
CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC);

-- Uploaded media
CREATE TABLE IF NOT EXISTS media (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    type TEXT NOT NULL CHECK(type IN ('IMAGE', 'VIDEO')),
    created_at TEXT NOT NULL
);

-- Post-media junction table
CREATE TABLE IF NOT EXISTS attachments (
    post_id TEXT NOT NULL,
    media_id TEXT NOT NULL,
    PRIMARY KEY (post_id, media_id),
    FOREIGN KEY (post_id) REFERENCES posts(id),
    FOREIGN KEY (media_id) REFERENCES media(id)
);

-- Follows table (one-way relationships)
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL,
    following_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (follower_id, following_id),
    FOREIGN KEY (follower_id) REFERENCES users(id),
    FOREIGN KEY (following_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_follows_following ON follows(following_id);

-- Likes table
CREATE TABLE IF NOT EXISTS likes (
    user_id TEXT NOT NULL,
    post_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, post_id),
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (post_id) REFERENCES posts(id)
);

CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id);

-- Bookmarks table
CREATE TABLE IF NOT EXISTS bookmarks (
    user_id TEXT NOT NULL,
    post_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, post_id),
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (post_id) REFERENCES posts(id)
);

-- Comments table
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    post_id TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id),
    FOREIGN KEY (post_id) REFERENCES posts(id)
);

CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);

-- Creator subscription tiers
CREATE TABLE IF NOT EXISTS subscription_tiers (
    id TEXT PRIMARY KEY,
    creator_id TEXT NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    price_cents INTEGER NOT NULL CHECK(price_cents >= 0),
    duration_months INTEGER NOT NULL CHECK(duration_months > 0),
    created_at TEXT NOT NULL,
    FOREIGN KEY (creator_id) REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_tiers_creator ON subscription_tiers(creator_id);

-- Subscriptions to tiers
CREATE TABLE IF NOT EXISTS subscriptions (
    id TEXT PRIMARY KEY,
    subscriber_id TEXT NOT NULL,
    tier_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (subscriber_id) REFERENCES users(id),
    FOREIGN KEY (tier_id) REFERENCES subscription_tiers(id)
);

-- Denormalised follower counts shown on profiles
CREATE TABLE IF NOT EXISTS follower_meta (
    user_id TEXT PRIMARY KEY,
    follower_count INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id)
);
"#;

/// Fixture data for development and testing
/// - 2 creators (ava with 3 posts, ben with 2 posts)
/// - 2 partial profiles without posts (cara has an avatar, dan has a bio)
/// - 4 completely blank users (blank_b has an empty bio)
/// - engagement rows touching the blank users so removal has something to clean
pub const TEST_DATA: &str = r#"
INSERT OR IGNORE INTO users (id, username, display_name, email, password_hash, bio, avatar_url, banner_image_url, is_verified, verification_status, created_at) VALUES
    ('a00000000000000000a1', 'ava', 'Ava', 'ava@example.com', 'x', 'Painter and night owl', '/a/local/ava.png', '/a/local/ava-banner.png', 1, 'APPROVED', '2023-02-01T10:00:00.000Z'),
    ('a00000000000000000b2', 'ben', NULL, 'ben@example.com', 'x', 'Street photography', NULL, NULL, 1, 'APPROVED', '2023-03-01T10:00:00.000Z'),
    ('a00000000000000000c3', 'cara', NULL, 'cara@example.com', 'x', NULL, '/a/local/cara.png', NULL, 0, 'PENDING', '2023-04-01T10:00:00.000Z'),
    ('a00000000000000000d4', 'dan', NULL, 'dan@example.com', 'x', 'Just browsing', NULL, NULL, 0, 'PENDING', '2023-05-01T10:00:00.000Z'),
    ('b00000000000000000e1', 'blank_a', 'blank_a', 'blank_a@example.com', 'x', NULL, NULL, NULL, 1, 'APPROVED', '2023-06-01T10:00:00.000Z'),
    ('b00000000000000000e2', 'blank_b', 'blank_b', 'blank_b@example.com', 'x', '', NULL, NULL, 1, 'APPROVED', '2023-06-02T10:00:00.000Z'),
    ('b00000000000000000e3', 'blank_c', 'blank_c', 'blank_c@example.com', 'x', NULL, NULL, NULL, 1, 'APPROVED', '2023-06-03T10:00:00.000Z'),
    ('b00000000000000000e4', 'blank_d', NULL, 'blank_d@example.com', 'x', NULL, NULL, NULL, 1, 'APPROVED', '2023-06-04T10:00:00.000Z');

INSERT OR IGNORE INTO posts (id, user_id, content, is_public, created_at) VALUES
    ('10000000-0000-4000-8000-000000000001', 'a00000000000000000a1', 'Morning sketch', 0, '2024-02-01T08:00:00.000Z'),
    ('10000000-0000-4000-8000-000000000002', 'a00000000000000000a1', 'Work in progress', 0, '2024-02-02T08:00:00.000Z'),
    ('10000000-0000-4000-8000-000000000003', 'a00000000000000000a1', '', 1, '2024-02-03T08:00:00.000Z'),
    ('10000000-0000-4000-8000-000000000004', 'a00000000000000000b2', 'Rainy crossing', 1, '2024-03-01T08:00:00.000Z'),
    ('10000000-0000-4000-8000-000000000005', 'a00000000000000000b2', 'Market day', 1, '2024-03-02T08:00:00.000Z');

INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES
    ('b00000000000000000e1', 'a00000000000000000a1', '2024-04-01T00:00:00.000Z'),
    ('a00000000000000000a1', 'b00000000000000000e1', '2024-04-01T00:00:00.000Z'),
    ('a00000000000000000c3', 'a00000000000000000a1', '2024-04-01T00:00:00.000Z');

INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES
    ('b00000000000000000e1', '10000000-0000-4000-8000-000000000001', '2024-04-02T00:00:00.000Z'),
    ('a00000000000000000d4', '10000000-0000-4000-8000-000000000001', '2024-04-02T00:00:00.000Z');

INSERT OR IGNORE INTO bookmarks (user_id, post_id, created_at) VALUES
    ('b00000000000000000e3', '10000000-0000-4000-8000-000000000004', '2024-04-03T00:00:00.000Z');

INSERT OR IGNORE INTO comments (id, user_id, post_id, content, created_at) VALUES
    ('20000000-0000-4000-8000-000000000001', 'b00000000000000000e4', '10000000-0000-4000-8000-000000000002', 'Love this', '2024-04-04T00:00:00.000Z');

INSERT OR IGNORE INTO subscription_tiers (id, creator_id, name, description, price_cents, duration_months, created_at) VALUES
    ('30000000-0000-4000-8000-000000000001', 'a00000000000000000a1', 'Basic', 'Basic subscription with limited content', 900, 1, '2024-01-01T00:00:00.000Z');

INSERT OR IGNORE INTO subscriptions (id, subscriber_id, tier_id, created_at) VALUES
    ('40000000-0000-4000-8000-000000000001', 'b00000000000000000e2', '30000000-0000-4000-8000-000000000001', '2024-04-05T00:00:00.000Z');

INSERT OR IGNORE INTO follower_meta (user_id, follower_count, created_at, updated_at) VALUES
    ('a00000000000000000a1', 1200, '2024-04-01T00:00:00.000Z', '2024-04-01T00:00:00.000Z'),
    ('b00000000000000000e1', 7, '2024-04-01T00:00:00.000Z', '2024-04-01T00:00:00.000Z');
"#;

/// Well-known ids from [`TEST_DATA`]
pub mod fixture {
    pub const AVA: &str = "a00000000000000000a1";
    pub const BEN: &str = "a00000000000000000b2";
    pub const CARA: &str = "a00000000000000000c3";
    pub const DAN: &str = "a00000000000000000d4";
    pub const BLANK_A: &str = "b00000000000000000e1";
    pub const BLANK_B: &str = "b00000000000000000e2";
    pub const BLANK_C: &str = "b00000000000000000e3";
    pub const BLANK_D: &str = "b00000000000000000e4";
    pub const BLANK_USERS: [&str; 4] = [BLANK_A, BLANK_B, BLANK_C, BLANK_D];
    pub const AVA_POSTS: [&str; 3] = [
        "10000000-0000-4000-8000-000000000001",
        "10000000-0000-4000-8000-000000000002",
        "10000000-0000-4000-8000-000000000003",
    ];
    pub const BEN_POSTS: [&str; 2] = [
        "10000000-0000-4000-8000-000000000004",
        "10000000-0000-4000-8000-000000000005",
    ];
}
