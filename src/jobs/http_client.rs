use crate::configuration::JobSearchSettings;
use crate::jobs::{JobSearch, Posting, SearchError, SearchQuery};
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;

/// Keyed GET against the search provider; the body is a JSON array of postings.
pub struct HttpJobSearch {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

impl HttpJobSearch {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<HttpJobSearch, anyhow::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build the job search HTTP client.")?;
        Ok(HttpJobSearch {
            http_client,
            base_url,
            api_key,
        })
    }

    pub fn from_settings(settings: &JobSearchSettings) -> Result<HttpJobSearch, anyhow::Error> {
        HttpJobSearch::new(
            settings.base_url.clone(),
            Secret::new(settings.api_key.expose_secret().clone()),
            settings.timeout(),
        )
    }
}

#[async_trait]
impl JobSearch for HttpJobSearch {
    #[tracing::instrument(
        name = "Query job search provider",
        skip(self, query),
        fields(phrase = %query.phrase, page = query.page)
    )]
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Posting>, SearchError> {
        let page = query.page.to_string();
        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[
                ("query", query.phrase.as_str()),
                ("location", query.geography.as_str()),
                ("page", page.as_str()),
                ("sort_by", query.sort_order.as_str()),
                ("api_key", self.api_key.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(SearchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status));
        }
        let body = response.bytes().await.map_err(SearchError::Transport)?;
        serde_json::from_slice(&body).map_err(SearchError::Decode)
    }
}
