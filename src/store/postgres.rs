use crate::configuration::DatabaseSettings;
use crate::domain::UserEmail;
use crate::models::{
    Company, NewCareerSite, NewCompany, NewRole, NewSubscription, Subscription, User,
};
use crate::store::{
    Catalog, IdentifierKind, IdentifierStore, StoreError, StoredSubscription, SubscriptionStore,
    UserStore,
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, QueryResult, RunQueryDsl};
use secrecy::ExposeSecret;
use std::collections::HashMap;

embed_migrations!();

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Postgres-backed store. Diesel is synchronous, so every query runs on the
/// blocking thread pool with its own pooled connection.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn connect(settings: &DatabaseSettings) -> Result<PgStore, anyhow::Error> {
        let manager =
            ConnectionManager::<PgConnection>::new(settings.connection_string().expose_secret());
        let pool = Pool::builder()
            .max_size(settings.max_connections)
            .build(manager)
            .context("Failed to build the Postgres connection pool.")?;
        Ok(PgStore { pool })
    }

    #[tracing::instrument(name = "Running database migrations", skip(self))]
    pub fn run_migrations(&self) -> Result<(), anyhow::Error> {
        let conn = self
            .pool
            .get()
            .context("Failed to check out a Postgres connection.")?;
        embedded_migrations::run(&*conn).context("Failed to run database migrations.")?;
        Ok(())
    }

    async fn run<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&PgConnection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool
                .get()
                .context("Failed to check out a Postgres connection.")?;
            f(&conn)
        })
        .await
        .context("A blocking database task failed to complete.")?
    }
}

#[async_trait]
impl UserStore for PgStore {
    #[tracing::instrument(name = "Look up user by email", skip(self))]
    async fn find_user_id(&self, email: &UserEmail) -> Result<Option<i64>, StoreError> {
        use crate::schema::users;
        let email = email.as_ref().to_string();
        self.run(move |conn| {
            let user = users::table
                .filter(users::email.eq(email.as_str()))
                .first::<User>(conn)
                .optional()
                .context("Failed to query users by email.")?;
            Ok(user.map(|u| u.id))
        })
        .await
    }
}

fn resolve_company(conn: &PgConnection, name: &str) -> QueryResult<i64> {
    use crate::schema::companies;
    diesel::insert_into(companies::table)
        .values(&NewCompany { name })
        .on_conflict_do_nothing()
        .execute(conn)?;
    companies::table
        .filter(companies::name.eq(name))
        .select(companies::id)
        .first(conn)
}

/// Returns the link's id together with the company that owns it, which is the
/// first company it was registered under.
fn resolve_career_site(
    conn: &PgConnection,
    link: &str,
    company_id: i64,
) -> QueryResult<(i64, i64)> {
    use crate::schema::career_sites;
    diesel::insert_into(career_sites::table)
        .values(&NewCareerSite { link, company_id })
        .on_conflict_do_nothing()
        .execute(conn)?;
    career_sites::table
        .filter(career_sites::link.eq(link))
        .select((career_sites::id, career_sites::company_id))
        .first(conn)
}

fn resolve_role(conn: &PgConnection, name: &str) -> QueryResult<i64> {
    use crate::schema::roles;
    diesel::insert_into(roles::table)
        .values(&NewRole { name })
        .on_conflict_do_nothing()
        .execute(conn)?;
    roles::table
        .filter(roles::name.eq(name))
        .select(roles::id)
        .first(conn)
}

fn find_id(conn: &PgConnection, kind: IdentifierKind, name: &str) -> QueryResult<Option<i64>> {
    use crate::schema::{career_sites, companies, roles};
    match kind {
        IdentifierKind::Company => companies::table
            .filter(companies::name.eq(name))
            .select(companies::id)
            .first(conn)
            .optional(),
        IdentifierKind::CareerSite => career_sites::table
            .filter(career_sites::link.eq(name))
            .select(career_sites::id)
            .first(conn)
            .optional(),
        IdentifierKind::Role => roles::table
            .filter(roles::name.eq(name))
            .select(roles::id)
            .first(conn)
            .optional(),
    }
}

fn load_names(
    conn: &PgConnection,
    kind: IdentifierKind,
    ids: Vec<i64>,
) -> QueryResult<Vec<(i64, String)>> {
    use crate::schema::{career_sites, companies, roles};
    match kind {
        IdentifierKind::Company => companies::table
            .filter(companies::id.eq_any(ids))
            .select((companies::id, companies::name))
            .load(conn),
        IdentifierKind::CareerSite => career_sites::table
            .filter(career_sites::id.eq_any(ids))
            .select((career_sites::id, career_sites::link))
            .load(conn),
        IdentifierKind::Role => roles::table
            .filter(roles::id.eq_any(ids))
            .select((roles::id, roles::name))
            .load(conn),
    }
}

#[async_trait]
impl IdentifierStore for PgStore {
    #[tracing::instrument(name = "Resolve or create identifier", skip(self))]
    async fn resolve_or_create(
        &self,
        kind: IdentifierKind,
        name: &str,
        parent: Option<i64>,
    ) -> Result<i64, StoreError> {
        let name = name.to_string();
        self.run(move |conn| {
            let context = || format!("Failed to resolve {} '{}'.", kind.as_str(), name);
            let id = match (kind, parent) {
                (IdentifierKind::Company, _) => resolve_company(conn, &name).with_context(context)?,
                (IdentifierKind::CareerSite, Some(company_id)) => {
                    let (id, owner) =
                        resolve_career_site(conn, &name, company_id).with_context(context)?;
                    if owner != company_id {
                        return Err(StoreError::Rejected(format!(
                            "Career link '{}' belongs to another company.",
                            name
                        )));
                    }
                    id
                }
                (IdentifierKind::CareerSite, None) => {
                    return Err(StoreError::Unexpected(anyhow!(
                        "Career site '{}' has no owning company.",
                        name
                    )))
                }
                (IdentifierKind::Role, _) => resolve_role(conn, &name).with_context(context)?,
            };
            Ok(id)
        })
        .await
    }

    #[tracing::instrument(name = "Find identifier", skip(self))]
    async fn find_id(&self, kind: IdentifierKind, name: &str) -> Result<Option<i64>, StoreError> {
        let name = name.to_string();
        self.run(move |conn| {
            let id = find_id(conn, kind, &name)
                .with_context(|| format!("Failed to look up {} '{}'.", kind.as_str(), name))?;
            Ok(id)
        })
        .await
    }

    #[tracing::instrument(name = "Load identifier names", skip(self))]
    async fn names(&self, kind: IdentifierKind, ids: &[i64]) -> Result<Vec<String>, StoreError> {
        let ids = ids.to_vec();
        self.run(move |conn| {
            let found: HashMap<i64, String> = load_names(conn, kind, ids.clone())
                .with_context(|| format!("Failed to load {} names.", kind.as_str()))?
                .into_iter()
                .collect();
            ids.iter()
                .map(|id| {
                    found.get(id).cloned().ok_or_else(|| {
                        StoreError::Unexpected(anyhow!(
                            "There is no {} with id {}.",
                            kind.as_str(),
                            id
                        ))
                    })
                })
                .collect()
        })
        .await
    }

    #[tracing::instrument(name = "Load subscription catalog", skip(self))]
    async fn catalog(&self) -> Result<Catalog, StoreError> {
        use crate::schema::{career_sites, companies, roles};
        self.run(|conn| {
            let all_companies = companies::table
                .order(companies::id.asc())
                .load::<Company>(conn)
                .context("Failed to load companies.")?;
            let links = career_sites::table
                .order(career_sites::id.asc())
                .select((career_sites::company_id, career_sites::link))
                .load::<(i64, String)>(conn)
                .context("Failed to load career sites.")?;
            let all_roles = roles::table
                .order(roles::id.asc())
                .select(roles::name)
                .load::<String>(conn)
                .context("Failed to load roles.")?;

            let mut catalog = Catalog {
                roles: all_roles,
                ..Catalog::default()
            };
            for company in all_companies {
                let company_links = links
                    .iter()
                    .filter(|(company_id, _)| *company_id == company.id)
                    .map(|(_, link)| link.clone())
                    .collect();
                catalog.companies.insert(company.name, company_links);
            }
            Ok(catalog)
        })
        .await
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    #[tracing::instrument(name = "Get subscription", skip(self))]
    async fn get(
        &self,
        user_id: i64,
        company_id: i64,
    ) -> Result<Option<StoredSubscription>, StoreError> {
        use crate::schema::subscriptions as subs;
        self.run(move |conn| {
            let row = subs::table
                .filter(subs::user_id.eq(user_id))
                .filter(subs::company_id.eq(company_id))
                .first::<Subscription>(conn)
                .optional()
                .context("Failed to fetch the subscription.")?;
            Ok(row.map(StoredSubscription::from))
        })
        .await
    }

    #[tracing::instrument(name = "Insert subscription", skip(self, subscription))]
    async fn insert(&self, subscription: &StoredSubscription) -> Result<(), StoreError> {
        use crate::schema::subscriptions;
        let subscription = subscription.clone();
        self.run(move |conn| {
            let inserted = diesel::insert_into(subscriptions::table)
                .values(&NewSubscription::from(&subscription))
                .on_conflict_do_nothing()
                .execute(conn)
                .context("Failed to insert the subscription.")?;
            match inserted {
                0 => Err(StoreError::Conflict),
                _ => Ok(()),
            }
        })
        .await
    }

    #[tracing::instrument(name = "Update subscription", skip(self, subscription))]
    async fn update(&self, subscription: &StoredSubscription) -> Result<(), StoreError> {
        use crate::schema::subscriptions as subs;
        let subscription = subscription.clone();
        self.run(move |conn| {
            let updated = diesel::update(
                subs::table
                    .filter(subs::user_id.eq(subscription.user_id))
                    .filter(subs::company_id.eq(subscription.company_id))
                    .filter(subs::version.eq(subscription.version)),
            )
            .set((
                subs::career_site_ids.eq(subscription.interests.career_site_ids()),
                subs::role_ids.eq(subscription.interests.role_ids()),
                subs::active.eq(subscription.active),
                subs::interest_time.eq(subscription.interest_time),
                subs::version.eq(subscription.version + 1),
            ))
            .execute(conn)
            .context("Failed to update the subscription.")?;
            match updated {
                0 => Err(StoreError::Conflict),
                _ => Ok(()),
            }
        })
        .await
    }

    #[tracing::instrument(name = "Delete subscription", skip(self))]
    async fn delete(&self, user_id: i64, company_id: i64) -> Result<bool, StoreError> {
        use crate::schema::subscriptions as subs;
        self.run(move |conn| {
            let deleted = diesel::delete(
                subs::table
                    .filter(subs::user_id.eq(user_id))
                    .filter(subs::company_id.eq(company_id)),
            )
            .execute(conn)
            .context("Failed to delete the subscription.")?;
            Ok(deleted > 0)
        })
        .await
    }

    #[tracing::instrument(name = "List subscriptions of user", skip(self))]
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<StoredSubscription>, StoreError> {
        use crate::schema::subscriptions as subs;
        self.run(move |conn| {
            let rows = subs::table
                .filter(subs::user_id.eq(user_id))
                .order(subs::company_id.asc())
                .load::<Subscription>(conn)
                .context("Failed to list subscriptions.")?;
            Ok(rows.into_iter().map(StoredSubscription::from).collect())
        })
        .await
    }
}
