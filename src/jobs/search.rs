use crate::jobs::Posting;
use async_trait::async_trait;
use std::time::Duration;

/// One upstream search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub phrase: String,
    pub geography: String,
    pub sort_order: String,
    pub page: u32,
}

impl SearchQuery {
    /// Query for the most recent first page of postings for `role` at `company`.
    pub fn for_pair(company: &str, role: &str, geography: &str, sort_order: &str) -> SearchQuery {
        SearchQuery {
            phrase: format!("{} AND {}", role, company),
            geography: geography.to_string(),
            sort_order: sort_order.to_string(),
            page: 1,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("Failed to reach the job search provider.")]
    Transport(#[source] reqwest::Error),
    #[error("The job search provider answered with {0}.")]
    Status(reqwest::StatusCode),
    #[error("The job search provider sent a response that is not a list of postings.")]
    Decode(#[source] serde_json::Error),
    #[error("The job search provider did not answer within {0:?}.")]
    Timeout(Duration),
}

#[async_trait]
pub trait JobSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Posting>, SearchError>;
}
