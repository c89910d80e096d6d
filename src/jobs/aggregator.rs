use crate::configuration::JobSearchSettings;
use crate::jobs::{matches, JobSearch, Posting, SearchError, SearchQuery};
use crate::routes::error_chain_fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::Instrument;

/// A subscribed company and the roles followed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobTarget {
    pub company: String,
    pub roles: Vec<String>,
}

#[derive(thiserror::Error)]
pub enum JobsError {
    #[error("Job search for '{role}' at '{company}' is unavailable.")]
    UpstreamUnavailable {
        company: String,
        role: String,
        #[source]
        source: SearchError,
    },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for JobsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Matching postings of every pair that answered, plus one failure per pair
/// that did not.
#[derive(Debug, Default)]
pub struct JobFeed {
    pub jobs: Vec<Posting>,
    pub failures: Vec<JobsError>,
    pub pairs_searched: usize,
}

impl JobFeed {
    pub fn all_failed(&self) -> bool {
        self.pairs_searched > 0 && self.failures.len() == self.pairs_searched
    }
}

#[derive(Clone)]
pub struct JobAggregator {
    search: Arc<dyn JobSearch>,
    geography: String,
    sort_order: String,
    timeout: Duration,
    max_concurrent_requests: usize,
}

impl JobAggregator {
    pub fn new(search: Arc<dyn JobSearch>, settings: &JobSearchSettings) -> JobAggregator {
        JobAggregator {
            search,
            geography: settings.geography.clone(),
            sort_order: settings.sort_order.clone(),
            timeout: settings.timeout(),
            max_concurrent_requests: settings.max_concurrent_requests.max(1),
        }
    }

    pub fn query_for(&self, company: &str, role: &str) -> SearchQuery {
        SearchQuery::for_pair(company, role, &self.geography, &self.sort_order)
    }

    /// Searches one pair and keeps the matching postings in upstream order.
    ///
    /// An empty result is a success; only a failed search is an error.
    #[tracing::instrument(name = "Fetch matching jobs", skip(self))]
    pub async fn fetch_matching_jobs(
        &self,
        company: &str,
        role: &str,
    ) -> Result<Vec<Posting>, JobsError> {
        let query = self.query_for(company, role);
        let postings = tokio::time::timeout(self.timeout, self.search.search(&query))
            .await
            .unwrap_or(Err(SearchError::Timeout(self.timeout)))
            .map_err(|source| JobsError::UpstreamUnavailable {
                company: company.to_string(),
                role: role.to_string(),
                source,
            })?;
        let found = postings.len();
        let matching: Vec<Posting> = postings
            .into_iter()
            .filter(|posting| matches(posting, company, role))
            .collect();
        tracing::info!(found, matching = matching.len(), "Filtered job postings");
        Ok(matching)
    }

    /// Searches every (company, role) pair of `targets`.
    ///
    /// At most `max_concurrent_requests` searches are in flight. Jobs are
    /// concatenated in target order, then role order, regardless of which
    /// search finished first. A failing pair is recorded and skipped.
    #[tracing::instrument(name = "Aggregate job feed", skip(self, targets))]
    pub async fn aggregate(&self, targets: Vec<JobTarget>) -> JobFeed {
        let limit = Arc::new(Semaphore::new(self.max_concurrent_requests));
        let pairs: Vec<(String, String)> = targets
            .into_iter()
            .flat_map(|target| {
                let company = target.company;
                target
                    .roles
                    .into_iter()
                    .map(move |role| (company.clone(), role))
            })
            .collect();

        let mut handles = Vec::with_capacity(pairs.len());
        for (company, role) in &pairs {
            let aggregator = self.clone();
            let limit = limit.clone();
            let (company, role) = (company.clone(), role.clone());
            let task = async move {
                let _permit = match limit.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => return Err(JobsError::UnexpectedError(e.into())),
                };
                aggregator.fetch_matching_jobs(&company, &role).await
            };
            handles.push(tokio::spawn(task.in_current_span()));
        }

        let mut feed = JobFeed {
            pairs_searched: pairs.len(),
            ..JobFeed::default()
        };
        for ((company, role), handle) in pairs.into_iter().zip(handles) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => Err(JobsError::UnexpectedError(anyhow::Error::new(e).context(
                    format!("The search for '{}' at '{}' did not complete.", role, company),
                ))),
            };
            match outcome {
                Ok(jobs) => feed.jobs.extend(jobs),
                Err(e) => {
                    tracing::warn!(error.cause_chain = ?e, "A job search failed");
                    feed.failures.push(e);
                }
            }
        }
        feed
    }
}
