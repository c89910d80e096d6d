use async_trait::async_trait;
use jobscoop::configuration::get_configuration;
use jobscoop::jobs::{JobSearch, Posting, SearchError, SearchQuery};
use jobscoop::startup::Application;
use jobscoop::store::{InMemoryStore, Stores};
use jobscoop::telemetry::{get_subscriber, init_subscriber};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".into();
    let subscriber_name = "test".into();
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub enum ScriptedReply {
    Postings(Vec<Posting>),
    Status(u16),
}

/// Stands in for the search provider. Replies are keyed by search phrase;
/// phrases without a reply get an empty list.
#[derive(Default)]
pub struct ScriptedJobSearch {
    replies: HashMap<String, ScriptedReply>,
    received: Mutex<Vec<SearchQuery>>,
}

impl ScriptedJobSearch {
    pub fn reply(mut self, role: &str, company: &str, reply: ScriptedReply) -> Self {
        self.replies
            .insert(format!("{} AND {}", role, company), reply);
        self
    }

    pub fn received(&self) -> Vec<SearchQuery> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSearch for ScriptedJobSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Posting>, SearchError> {
        self.received.lock().unwrap().push(query.clone());
        match self.replies.get(&query.phrase) {
            None => Ok(vec![]),
            Some(ScriptedReply::Postings(postings)) => Ok(postings.clone()),
            Some(ScriptedReply::Status(code)) => Err(SearchError::Status(
                reqwest::StatusCode::from_u16(*code).unwrap(),
            )),
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub job_search: Arc<ScriptedJobSearch>,
    pub api_client: reqwest::Client,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(ScriptedJobSearch::default()).await
}

pub async fn spawn_app_with(job_search: ScriptedJobSearch) -> TestApp {
    Lazy::force(&TRACING);

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration.");
        c.application.port = None;
        c.application.host = "127.0.0.1".parse().unwrap();
        c
    };

    let store = Arc::new(InMemoryStore::new());
    let job_search = Arc::new(job_search);
    let app = Application::build(
        &configuration,
        Stores::shared(store.clone()),
        job_search.clone(),
    )
    .await
    .expect("Failed to build application.");
    let mut port = app.port;
    let _ = tokio::spawn(app.server.launch());
    let port = port.get().await.expect("The server never lifted off.");

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        store,
        job_search,
        api_client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn add_user(&self, email: &str) -> i64 {
        self.store.add_user(email)
    }

    pub async fn save_subscriptions(&self, body: &Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/save-subscriptions", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn update_subscriptions(&self, body: &Value) -> reqwest::Response {
        self.api_client
            .put(&format!("{}/update-subscriptions", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn delete_subscriptions(&self, body: &Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/delete-subscriptions", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn fetch_user_subscriptions(&self, email: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/fetch-user-subscriptions", &self.address))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn fetch_all_subscriptions(&self) -> reqwest::Response {
        self.api_client
            .get(&format!("{}/fetch-all-subscriptions", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn jobs(&self, email: &str) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/jobs", &self.address))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
