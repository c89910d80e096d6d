use crate::jobs::JobsError;
use crate::routes::error_chain_fmt;
use crate::store::StoreError;
use crate::subscription::{BatchOutcome, SubscriptionError};
use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use rocket::Request;

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong on our side. Please try again later.";

#[derive(thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
    #[error(transparent)]
    Jobs(#[from] JobsError),
}

impl std::fmt::Debug for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::InvalidInput(_) => Status::BadRequest,
            ApiError::Subscription(e) => subscription_status(e),
            ApiError::Jobs(JobsError::UpstreamUnavailable { .. }) => Status::BadGateway,
            ApiError::Jobs(JobsError::UnexpectedError(_)) => Status::InternalServerError,
        }
    }

    /// What the caller gets to see. Unexpected failures stay in the logs.
    pub fn message(&self) -> String {
        match self {
            ApiError::Subscription(e) => subscription_message(e),
            ApiError::Jobs(JobsError::UnexpectedError(_)) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

fn subscription_status(error: &SubscriptionError) -> Status {
    match error {
        SubscriptionError::UnknownUser
        | SubscriptionError::UnknownCompany(_)
        | SubscriptionError::NotSubscribed(_) => Status::NotFound,
        SubscriptionError::Conflict { .. } => Status::Conflict,
        SubscriptionError::Resolution {
            source: StoreError::Rejected(_),
            ..
        } => Status::BadRequest,
        SubscriptionError::Resolution { .. } | SubscriptionError::UnexpectedError(_) => {
            Status::InternalServerError
        }
    }
}

fn subscription_message(error: &SubscriptionError) -> String {
    match error {
        SubscriptionError::UnexpectedError(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        SubscriptionError::Resolution {
            source: StoreError::Rejected(reason),
            ..
        } => reason.clone(),
        other => other.to_string(),
    }
}

#[derive(serde::Serialize)]
pub struct MessageBody {
    pub message: String,
    pub status: &'static str,
}

impl MessageBody {
    pub fn error(message: String) -> Json<MessageBody> {
        Json(MessageBody {
            message,
            status: "error",
        })
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        tracing::warn!(error.cause_chain = ?self, "Request failed");
        (self.status(), MessageBody::error(self.message())).respond_to(request)
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEntry {
    pub company_name: String,
    pub message: String,
}

#[derive(serde::Serialize)]
pub struct BatchBody {
    pub message: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub succeeded: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<FailedEntry>,
}

/// 200 when every entry went through, 207 when only some did. When none did,
/// the first failure decides the status.
pub fn batch_reply(outcome: BatchOutcome, success_message: &str) -> (Status, Json<BatchBody>) {
    let BatchOutcome { succeeded, failed } = outcome;
    let first_failure_status = match failed.first() {
        None => {
            let body = BatchBody {
                message: success_message.to_string(),
                status: "success",
                succeeded: vec![],
                failed: vec![],
            };
            return (Status::Ok, Json(body));
        }
        Some(first) => subscription_status(&first.error),
    };
    let failed: Vec<FailedEntry> = failed
        .into_iter()
        .map(|entry| FailedEntry {
            message: subscription_message(&entry.error),
            company_name: entry.company,
        })
        .collect();

    if succeeded.is_empty() {
        let body = BatchBody {
            message: failed
                .first()
                .map(|entry| entry.message.clone())
                .unwrap_or_default(),
            status: "error",
            succeeded,
            failed,
        };
        return (first_failure_status, Json(body));
    }
    let body = BatchBody {
        message: "Some subscriptions could not be processed".to_string(),
        status: "partial",
        succeeded,
        failed,
    };
    (Status::MultiStatus, Json(body))
}
