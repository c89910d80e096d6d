use crate::routes::MessageBody;
use rocket::serde::json::Json;
use rocket::Request;

#[catch(400)]
pub fn bad_request_to_json(_req: &Request) -> Json<MessageBody> {
    MessageBody::error("Invalid request payload".to_string())
}
