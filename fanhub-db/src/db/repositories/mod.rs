mod user_repository;
mod post_repository;
mod follow_repository;
mod like_repository;
mod tier_repository;
mod meta_repository;

pub use user_repository::UserRepository;
pub use post_repository::PostRepository;
pub use follow_repository::FollowRepository;
pub use like_repository::LikeRepository;
pub use tier_repository::TierRepository;
pub use meta_repository::FollowerMetaRepository;
