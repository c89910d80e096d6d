//! Live job feed: one upstream search per subscribed (company, role) pair,
//! filtered down to the postings that actually match the pair.

mod aggregator;
mod http_client;
mod matcher;
mod posting;
mod search;

pub use aggregator::{JobAggregator, JobFeed, JobTarget, JobsError};
pub use http_client::HttpJobSearch;
pub use matcher::{company_matches, matches, role_matches, role_tokens};
pub use posting::Posting;
pub use search::{JobSearch, SearchError, SearchQuery};
