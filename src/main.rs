use anyhow::{anyhow, Context};
use jobscoop::configuration::get_configuration;
use jobscoop::jobs::HttpJobSearch;
use jobscoop::startup::Application;
use jobscoop::store::{PgStore, Stores};
use jobscoop::telemetry::{get_subscriber, init_subscriber};
use std::sync::Arc;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("jobscoop".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().context("Failed to read configuration.")?;
    let store = PgStore::connect(&configuration.database)?;
    store.run_migrations()?;
    let job_search = HttpJobSearch::from_settings(&configuration.job_search)?;

    let application = Application::build(
        &configuration,
        Stores::shared(Arc::new(store)),
        Arc::new(job_search),
    )
    .await
    .map_err(|e| anyhow!(e.to_string()))?;
    application
        .server
        .launch()
        .await
        .map_err(|e| anyhow!(e.to_string()))?;
    Ok(())
}
