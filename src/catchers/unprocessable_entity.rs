use crate::routes::MessageBody;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::Request;

/// Well-formed JSON that does not fit the request type is still the caller's fault.
#[catch(422)]
pub fn unprocessable_entity_to_bad_request(_req: &Request) -> (Status, Json<MessageBody>) {
    (
        Status::BadRequest,
        MessageBody::error("Invalid request payload".to_string()),
    )
}
