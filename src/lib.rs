#[macro_use]
extern crate rocket;
#[macro_use]
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

pub mod catchers;
pub mod configuration;
pub mod domain;
pub mod jobs;
pub mod models;
pub mod port_saver;
pub mod routes;
pub mod schema;
pub mod startup;
pub mod store;
pub mod subscription;
pub mod telemetry;
