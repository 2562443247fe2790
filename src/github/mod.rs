// GitHub module.
// HTTP client, the structured API strategy, and repository types.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::GitHubClient;
pub use endpoints::{ApiSource, normalize_repos};
pub use types::{ApiRepository, RateLimit, RepoSummary, parse_timestamp};
