use crate::domain::{CareerLink, CompanyName, RoleName, UserEmail};
use crate::routes::{batch_reply, ApiError, BatchBody};
use crate::subscription::{
    FieldUpdate, InterestUpdate, NewInterest, SubscriptionService, SubscriptionView,
};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(serde::Deserialize)]
pub struct SaveRequest {
    email: String,
    #[serde(default)]
    subscriptions: Vec<SaveEntry>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveEntry {
    company_name: String,
    #[serde(default)]
    career_links: Vec<String>,
    #[serde(default)]
    role_names: Vec<String>,
}

#[derive(serde::Deserialize)]
pub struct UpdateRequest {
    email: String,
    #[serde(default)]
    subscriptions: Vec<UpdateEntry>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntry {
    company_name: String,
    career_links: Option<Vec<String>>,
    role_names: Option<Vec<String>>,
    active: Option<bool>,
}

#[derive(serde::Deserialize)]
pub struct DeleteRequest {
    email: String,
    #[serde(default)]
    subscriptions: Vec<String>,
}

#[derive(serde::Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

fn parse_all<T>(values: Vec<String>, parse: fn(String) -> Result<T, String>) -> Result<Vec<T>, String> {
    values.into_iter().map(parse).collect()
}

/// An absent list and an empty list both leave the stored field alone.
fn list_update<T>(
    values: Option<Vec<String>>,
    parse: fn(String) -> Result<T, String>,
) -> Result<FieldUpdate<Vec<T>>, String> {
    match values {
        Some(values) if !values.is_empty() => Ok(FieldUpdate::Replace(parse_all(values, parse)?)),
        _ => Ok(FieldUpdate::Keep),
    }
}

impl TryFrom<SaveEntry> for NewInterest {
    type Error = String;

    fn try_from(entry: SaveEntry) -> Result<Self, Self::Error> {
        Ok(NewInterest {
            company: CompanyName::parse(entry.company_name)?,
            career_links: parse_all(entry.career_links, CareerLink::parse)?,
            roles: parse_all(entry.role_names, RoleName::parse)?,
        })
    }
}

impl TryFrom<UpdateEntry> for InterestUpdate {
    type Error = String;

    fn try_from(entry: UpdateEntry) -> Result<Self, Self::Error> {
        Ok(InterestUpdate {
            company: CompanyName::parse(entry.company_name)?,
            career_links: list_update(entry.career_links, CareerLink::parse)?,
            roles: list_update(entry.role_names, RoleName::parse)?,
            active: entry.active.into(),
        })
    }
}

pub fn parse_email(email: String) -> Result<UserEmail, ApiError> {
    UserEmail::parse(email).map_err(ApiError::InvalidInput)
}

fn parse_entries<E, T>(entries: Vec<E>) -> Result<Vec<T>, ApiError>
where
    T: TryFrom<E, Error = String>,
{
    entries
        .into_iter()
        .map(T::try_from)
        .collect::<Result<Vec<T>, String>>()
        .map_err(ApiError::InvalidInput)
}

fn require_entries<T>(entries: &[T]) -> Result<(), ApiError> {
    match entries.is_empty() {
        true => Err(ApiError::InvalidInput(
            "At least one subscription is required.".to_string(),
        )),
        false => Ok(()),
    }
}

#[tracing::instrument(
    name = "Saving subscriptions",
    skip(body, service),
    fields(
        request_id = %Uuid::new_v4(),
        user_email = %body.email,
        entries = body.subscriptions.len()
    )
)]
#[post("/save-subscriptions", data = "<body>")]
pub async fn save_subscriptions(
    body: Json<SaveRequest>,
    service: &State<SubscriptionService>,
) -> Result<(Status, Json<BatchBody>), ApiError> {
    let SaveRequest {
        email,
        subscriptions,
    } = body.into_inner();
    let email = parse_email(email)?;
    let entries: Vec<NewInterest> = parse_entries(subscriptions)?;
    let outcome = service.save(&email, entries).await?;
    Ok(batch_reply(outcome, "Subscription processed successfully"))
}

#[tracing::instrument(
    name = "Updating subscriptions",
    skip(body, service),
    fields(
        request_id = %Uuid::new_v4(),
        user_email = %body.email,
        entries = body.subscriptions.len()
    )
)]
#[put("/update-subscriptions", data = "<body>")]
pub async fn update_subscriptions(
    body: Json<UpdateRequest>,
    service: &State<SubscriptionService>,
) -> Result<(Status, Json<BatchBody>), ApiError> {
    let UpdateRequest {
        email,
        subscriptions,
    } = body.into_inner();
    let email = parse_email(email)?;
    require_entries(&subscriptions)?;
    let entries: Vec<InterestUpdate> = parse_entries(subscriptions)?;
    let outcome = service.update(&email, entries).await?;
    Ok(batch_reply(outcome, "Subscriptions updated successfully"))
}

#[tracing::instrument(
    name = "Deleting subscriptions",
    skip(body, service),
    fields(
        request_id = %Uuid::new_v4(),
        user_email = %body.email,
        entries = body.subscriptions.len()
    )
)]
#[post("/delete-subscriptions", data = "<body>")]
pub async fn delete_subscriptions(
    body: Json<DeleteRequest>,
    service: &State<SubscriptionService>,
) -> Result<(Status, Json<BatchBody>), ApiError> {
    let DeleteRequest {
        email,
        subscriptions,
    } = body.into_inner();
    let email = parse_email(email)?;
    require_entries(&subscriptions)?;
    let companies =
        parse_all(subscriptions, CompanyName::parse).map_err(ApiError::InvalidInput)?;
    let outcome = service.delete(&email, companies).await?;
    Ok(batch_reply(outcome, "Deleted subscription(s) successfully"))
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionBody {
    company_name: String,
    career_links: Vec<String>,
    role_names: Vec<String>,
    active: bool,
    interest_time: String,
}

impl From<SubscriptionView> for SubscriptionBody {
    fn from(view: SubscriptionView) -> Self {
        SubscriptionBody {
            company_name: view.company_name,
            career_links: view.career_links,
            role_names: view.role_names,
            active: view.active,
            interest_time: view.interest_time.to_rfc3339(),
        }
    }
}

#[derive(serde::Serialize)]
pub struct UserSubscriptionsBody {
    status: &'static str,
    subscriptions: Vec<SubscriptionBody>,
}

#[tracing::instrument(
    name = "Fetching user subscriptions",
    skip(body, service),
    fields(request_id = %Uuid::new_v4(), user_email = %body.email)
)]
#[post("/fetch-user-subscriptions", data = "<body>")]
pub async fn fetch_user_subscriptions(
    body: Json<EmailRequest>,
    service: &State<SubscriptionService>,
) -> Result<Json<UserSubscriptionsBody>, ApiError> {
    let email = parse_email(body.into_inner().email)?;
    let subscriptions = service.list(&email).await?;
    Ok(Json(UserSubscriptionsBody {
        status: "success",
        subscriptions: subscriptions.into_iter().map(SubscriptionBody::from).collect(),
    }))
}

#[derive(serde::Serialize)]
pub struct CatalogBody {
    companies: BTreeMap<String, Vec<String>>,
    roles: Vec<String>,
}

#[tracing::instrument(
    name = "Fetching all subscriptions",
    skip(service),
    fields(request_id = %Uuid::new_v4())
)]
#[get("/fetch-all-subscriptions")]
pub async fn fetch_all_subscriptions(
    service: &State<SubscriptionService>,
) -> Result<Json<CatalogBody>, ApiError> {
    let catalog = service.catalog().await?;
    Ok(Json(CatalogBody {
        companies: catalog.companies,
        roles: catalog.roles,
    }))
}
