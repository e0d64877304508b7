use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Approved => "APPROVED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PENDING" => Some(VerificationStatus::Pending),
            "APPROVED" => Some(VerificationStatus::Approved),
            "REJECTED" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "IMAGE",
            MediaType::Video => "VIDEO",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "IMAGE" => Some(MediaType::Image),
            "VIDEO" => Some(MediaType::Video),
            _ => None,
        }
    }
}

/// Post-count ranges used by the blank user report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostRange {
    None,
    OneToFive,
    SixToTwenty,
    TwentyOneToFifty,
    FiftyOneToHundred,
    OverHundred,
}

impl PostRange {
    /// All ranges in ascending order.
    pub const ALL: [PostRange; 6] = [
        PostRange::None,
        PostRange::OneToFive,
        PostRange::SixToTwenty,
        PostRange::TwentyOneToFifty,
        PostRange::FiftyOneToHundred,
        PostRange::OverHundred,
    ];

    pub fn classify(post_count: u64) -> Self {
        match post_count {
            0 => PostRange::None,
            1..=5 => PostRange::OneToFive,
            6..=20 => PostRange::SixToTwenty,
            21..=50 => PostRange::TwentyOneToFifty,
            51..=100 => PostRange::FiftyOneToHundred,
            _ => PostRange::OverHundred,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostRange::None => "0 posts",
            PostRange::OneToFive => "1-5 posts",
            PostRange::SixToTwenty => "6-20 posts",
            PostRange::TwentyOneToFifty => "21-50 posts",
            PostRange::FiftyOneToHundred => "51-100 posts",
            PostRange::OverHundred => "More than 100 posts",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_verification_status_round_trip() {
        for status in [
            VerificationStatus::Pending,
            VerificationStatus::Approved,
            VerificationStatus::Rejected,
        ] {
            assert_eq!(VerificationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(VerificationStatus::parse("approved"), Some(VerificationStatus::Approved));
        assert_eq!(VerificationStatus::parse("maybe"), None);
    }

    #[test]
    fn test_media_type_serializes_uppercase() {
        let json = serde_json::to_string(&MediaType::Image).unwrap();
        assert_eq!(json, "\"IMAGE\"");
        assert_eq!(MediaType::parse("video"), Some(MediaType::Video));
    }

    #[test]
    fn test_post_range_boundaries() {
        assert_eq!(PostRange::classify(0), PostRange::None);
        assert_eq!(PostRange::classify(1), PostRange::OneToFive);
        assert_eq!(PostRange::classify(5), PostRange::OneToFive);
        assert_eq!(PostRange::classify(6), PostRange::SixToTwenty);
        assert_eq!(PostRange::classify(20), PostRange::SixToTwenty);
        assert_eq!(PostRange::classify(21), PostRange::TwentyOneToFifty);
        assert_eq!(PostRange::classify(50), PostRange::TwentyOneToFifty);
        assert_eq!(PostRange::classify(51), PostRange::FiftyOneToHundred);
        assert_eq!(PostRange::classify(100), PostRange::FiftyOneToHundred);
        assert_eq!(PostRange::classify(101), PostRange::OverHundred);
    }

    proptest! {
        // Classification never moves to a lower range as the count grows
        #[test]
        fn prop_classify_is_monotonic(a in 0u64..1000, b in 0u64..1000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let position = |range: PostRange| PostRange::ALL.iter().position(|r| *r == range).unwrap();
            prop_assert!(position(PostRange::classify(lo)) <= position(PostRange::classify(hi)));
        }
    }
}
