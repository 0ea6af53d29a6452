pub mod catalog;
pub mod client;
pub mod error;
pub mod hierarchy;
pub mod matcher;
pub mod media;
pub mod throttle;
pub mod types;

pub use catalog::CatalogService;
pub use client::TvMazeClient;
pub use error::CatalogError;
pub use hierarchy::fetch_hierarchy;
pub use matcher::{MatchOutcome, ShowMatcher, classify_candidates, score_name};
pub use media::{CachedPosters, PosterCache};
pub use throttle::{RateLimiter, ThrottledCatalog};
