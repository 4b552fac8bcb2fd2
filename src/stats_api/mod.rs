pub mod cache;
pub mod client;
pub mod feed;
pub mod provider;

pub use cache::FeedCache;
pub use client::StatsApi;
pub use feed::GameFeed;
pub use provider::GameFeedProvider;
