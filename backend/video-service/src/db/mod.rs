pub mod comment_repo;
pub mod like_repo;
pub mod subscription_repo;
pub mod tweet_repo;
pub mod user_repo;
pub mod video_repo;
pub mod watch_history_repo;

pub use comment_repo::CommentRepository;
pub use like_repo::LikeRepository;
pub use subscription_repo::SubscriptionRepository;
pub use tweet_repo::TweetRepository;
pub use user_repo::UserRepository;
pub use video_repo::{NewVideo, VideoRepository, VideoUpdate};
pub use watch_history_repo::WatchHistoryRepository;
