use crate::schema::subscriptions;
use crate::store::StoredSubscription;
use crate::subscription::InterestSet;
use chrono::offset::Utc;
use chrono::DateTime;

#[derive(Queryable)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub company_id: i64,
    pub career_site_ids: Vec<i64>,
    pub role_ids: Vec<i64>,
    pub active: bool,
    pub interest_time: DateTime<Utc>,
    pub version: i64,
}

#[derive(Insertable)]
#[table_name = "subscriptions"]
pub struct NewSubscription<'a> {
    pub user_id: i64,
    pub company_id: i64,
    pub career_site_ids: Vec<i64>,
    pub role_ids: Vec<i64>,
    pub active: bool,
    pub interest_time: &'a DateTime<Utc>,
    pub version: i64,
}

impl From<Subscription> for StoredSubscription {
    fn from(row: Subscription) -> Self {
        StoredSubscription {
            user_id: row.user_id,
            company_id: row.company_id,
            interests: InterestSet::new(row.career_site_ids, row.role_ids),
            active: row.active,
            interest_time: row.interest_time,
            version: row.version,
        }
    }
}

impl<'a> From<&'a StoredSubscription> for NewSubscription<'a> {
    fn from(subscription: &'a StoredSubscription) -> Self {
        NewSubscription {
            user_id: subscription.user_id,
            company_id: subscription.company_id,
            career_site_ids: subscription.interests.career_site_ids(),
            role_ids: subscription.interests.role_ids(),
            active: subscription.active,
            interest_time: &subscription.interest_time,
            version: subscription.version,
        }
    }
}
