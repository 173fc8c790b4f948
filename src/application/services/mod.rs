pub mod comment_loader;
pub mod feed_service;
pub mod live_feed;

pub use comment_loader::CommentThreadLoader;
pub use feed_service::{FeedService, NewPost};
pub use live_feed::{FeedPhase, FeedSnapshot, LiveFeed};
