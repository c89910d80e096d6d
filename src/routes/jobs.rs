use crate::jobs::{JobAggregator, JobTarget, JobsError, Posting};
use crate::routes::{parse_email, ApiError, EmailRequest};
use crate::subscription::SubscriptionService;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairFailureBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_name: Option<String>,
    message: String,
}

impl From<JobsError> for PairFailureBody {
    fn from(error: JobsError) -> Self {
        let (company_name, role_name) = match &error {
            JobsError::UpstreamUnavailable { company, role, .. } => {
                (Some(company.clone()), Some(role.clone()))
            }
            JobsError::UnexpectedError(_) => (None, None),
        };
        PairFailureBody {
            company_name,
            role_name,
            message: ApiError::Jobs(error).message(),
        }
    }
}

#[derive(serde::Serialize)]
pub struct JobFeedBody {
    jobs: Vec<Posting>,
    failures: Vec<PairFailureBody>,
}

#[tracing::instrument(
    name = "Building job feed",
    skip(body, service, aggregator),
    fields(request_id = %Uuid::new_v4(), user_email = %body.email)
)]
#[post("/jobs", data = "<body>")]
pub async fn job_feed(
    body: Json<EmailRequest>,
    service: &State<SubscriptionService>,
    aggregator: &State<JobAggregator>,
) -> Result<Json<JobFeedBody>, ApiError> {
    let email = parse_email(body.into_inner().email)?;
    let targets: Vec<JobTarget> = service
        .list(&email)
        .await?
        .into_iter()
        .filter(|subscription| subscription.active)
        .map(|subscription| JobTarget {
            company: subscription.company_name,
            roles: subscription.role_names,
        })
        .collect();

    let feed = aggregator.aggregate(targets).await;
    let all_failed = feed.all_failed();
    let mut failures = feed.failures.into_iter();
    if all_failed {
        if let Some(error) = failures.next() {
            return Err(error.into());
        }
    }
    Ok(Json(JobFeedBody {
        jobs: feed.jobs,
        failures: failures.map(PairFailureBody::from).collect(),
    }))
}
