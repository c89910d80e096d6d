use crate::catchers::*;
use crate::configuration::Settings;
use crate::jobs::{JobAggregator, JobSearch};
use crate::port_saver;
use crate::port_saver::Port;
use crate::routes::*;
use crate::store::Stores;
use crate::subscription::SubscriptionService;
use rocket::{Config, Ignite, Rocket};
use std::sync::Arc;

pub struct Application {
    pub server: Rocket<Ignite>,
    pub port: Port,
}

impl Application {
    pub async fn build(
        configuration: &Settings,
        stores: Stores,
        job_search: Arc<dyn JobSearch>,
    ) -> Result<Application, rocket::Error> {
        let (port_saver, port) = port_saver::create_pair();
        let server = rocket::custom(Config {
            address: configuration.application.host,
            port: configuration.application.port.unwrap_or(0),
            ..Config::default()
        })
        .attach(port_saver)
        .manage(SubscriptionService::new(stores))
        .manage(JobAggregator::new(job_search, &configuration.job_search))
        .mount(
            "/",
            routes![
                health,
                save_subscriptions,
                update_subscriptions,
                delete_subscriptions,
                fetch_user_subscriptions,
                fetch_all_subscriptions,
                job_feed
            ],
        )
        .register(
            "/",
            catchers![unprocessable_entity_to_bad_request, bad_request_to_json],
        )
        .ignite()
        .await?;
        Ok(Application { server, port })
    }
}
