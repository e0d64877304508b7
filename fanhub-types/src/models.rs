use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{MediaType, PostRange, VerificationStatus};

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339_opts(SecondsFormat::Millis, true);
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner_image_url: Option<String>,
    pub is_verified: bool,
    pub verification_status: VerificationStatus,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Name shown in reports, falling back to the username
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// Lightweight user row used when listing blank accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

impl UserSummary {
    pub fn shown_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }
}

/// A user with at least one post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: String,
    pub username: String,
    pub post_count: u64,
    pub follower_count: u64,
}

/// Post id together with its current like count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRef {
    pub id: String,
    pub like_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub content: String,
    /// Subscriber-only posts are not public
    pub is_public: bool,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub url: String,
    pub media_type: MediaType,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionTier {
    pub id: String,
    pub creator_id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub duration_months: u32,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// Denormalised follower count kept per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerMeta {
    pub user_id: String,
    pub follower_count: u64,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCountBucket {
    pub range: PostRange,
    pub user_count: u64,
}

impl PostCountBucket {
    pub fn label(&self) -> &'static str {
        self.range.label()
    }
}

/// Blank-profile statistics for the whole user table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlankUserReport {
    pub without_posts: u64,
    pub without_avatar: u64,
    pub without_bio: u64,
    pub completely_blank: u64,
    pub total_users: u64,
    pub post_distribution: Vec<PostCountBucket>,
    pub sample: Vec<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_user() -> User {
        User {
            id: "0123456789abcdef0123".to_string(),
            username: "happytiger42".to_string(),
            display_name: None,
            email: "happytiger424242@gmail.com".to_string(),
            password_hash: "$2b$04$secret".to_string(),
            bio: None,
            avatar_url: None,
            banner_image_url: None,
            is_verified: true,
            verification_status: VerificationStatus::Approved,
            created_at: Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["verification_status"], "APPROVED");
        assert_eq!(json["created_at"], "2023-05-01T12:00:00.000Z");
    }

    #[test]
    fn test_shown_name_falls_back_to_username() {
        let mut user = sample_user();
        assert_eq!(user.shown_name(), "happytiger42");
        user.display_name = Some("Happy Tiger".to_string());
        assert_eq!(user.shown_name(), "Happy Tiger");

        let summary = UserSummary {
            id: user.id.clone(),
            username: user.username.clone(),
            display_name: Some(String::new()),
            created_at: user.created_at,
        };
        assert_eq!(summary.shown_name(), "happytiger42");
    }

    #[test]
    fn test_report_buckets_use_range_labels() {
        let bucket = PostCountBucket {
            range: PostRange::SixToTwenty,
            user_count: 3,
        };
        assert_eq!(bucket.label(), "6-20 posts");
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["range"], "six_to_twenty");
    }
}
