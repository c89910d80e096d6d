mod bad_request;
mod unprocessable_entity;

pub use bad_request::*;
pub use unprocessable_entity::*;
