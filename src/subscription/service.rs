use crate::domain::{CareerLink, CompanyName, RoleName, UserEmail};
use crate::routes::error_chain_fmt;
use crate::store::{Catalog, IdentifierKind, StoreError, StoredSubscription, Stores};
use crate::subscription::{merge, FieldUpdate, InterestPatch, InterestSet};
use anyhow::Context;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// One company entry of an additive save.
#[derive(Debug, Clone)]
pub struct NewInterest {
    pub company: CompanyName,
    pub career_links: Vec<CareerLink>,
    pub roles: Vec<RoleName>,
}

/// One company entry of an explicit update.
#[derive(Debug, Clone)]
pub struct InterestUpdate {
    pub company: CompanyName,
    pub career_links: FieldUpdate<Vec<CareerLink>>,
    pub roles: FieldUpdate<Vec<RoleName>>,
    pub active: FieldUpdate<bool>,
}

/// A subscription with its identifiers turned back into names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionView {
    pub company_name: String,
    pub career_links: Vec<String>,
    pub role_names: Vec<String>,
    pub active: bool,
    pub interest_time: DateTime<Utc>,
}

#[derive(Debug)]
pub struct EntryFailure {
    pub company: String,
    pub error: SubscriptionError,
}

/// Per-company results of a batch. Entries are independent of each other.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<EntryFailure>,
}

impl BatchOutcome {
    fn record(&mut self, company: String, result: Result<(), SubscriptionError>) {
        match result {
            Ok(()) => self.succeeded.push(company),
            Err(error) => {
                tracing::warn!(
                    error.cause_chain = ?error,
                    company = %company,
                    "Subscription entry was not applied",
                );
                self.failed.push(EntryFailure { company, error });
            }
        }
    }
}

#[derive(thiserror::Error)]
pub enum SubscriptionError {
    #[error("User not found. Please sign up.")]
    UnknownUser,
    #[error("Company '{0}' does not exist.")]
    UnknownCompany(String),
    #[error("There is no subscription to '{0}'.")]
    NotSubscribed(String),
    #[error("Failed to process the names submitted for '{company}'.")]
    Resolution {
        company: String,
        #[source]
        source: StoreError,
    },
    #[error("The subscription to '{company}' was changed by another request. Please retry.")]
    Conflict { company: String },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for SubscriptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

fn write_failure(company: &str, error: StoreError) -> SubscriptionError {
    match error {
        StoreError::Conflict => SubscriptionError::Conflict {
            company: company.to_string(),
        },
        StoreError::Rejected(reason) => SubscriptionError::UnexpectedError(anyhow::anyhow!(
            "Writing the subscription to '{}' was rejected: {}",
            company,
            reason
        )),
        StoreError::Unexpected(e) => SubscriptionError::UnexpectedError(
            e.context(format!("Failed to write the subscription to '{}'.", company)),
        ),
    }
}

pub struct SubscriptionService {
    stores: Stores,
}

impl SubscriptionService {
    pub fn new(stores: Stores) -> SubscriptionService {
        SubscriptionService { stores }
    }

    #[tracing::instrument(name = "Resolve user from email", skip(self))]
    pub async fn user_id(&self, email: &UserEmail) -> Result<i64, SubscriptionError> {
        self.stores
            .users
            .find_user_id(email)
            .await
            .context("Failed to look up the user.")?
            .ok_or(SubscriptionError::UnknownUser)
    }

    /// Adds the submitted career sites and roles to the user's subscriptions.
    #[tracing::instrument(name = "Save subscriptions", skip(self, entries), fields(entries = entries.len()))]
    pub async fn save(
        &self,
        email: &UserEmail,
        entries: Vec<NewInterest>,
    ) -> Result<BatchOutcome, SubscriptionError> {
        let user_id = self.user_id(email).await?;
        let mut outcome = BatchOutcome::default();
        for entry in entries {
            let company = entry.company.as_ref().to_string();
            let result = self.save_entry(user_id, entry).await;
            outcome.record(company, result);
        }
        Ok(outcome)
    }

    #[tracing::instrument(name = "Save subscription entry", skip(self, entry), fields(company = %entry.company.as_ref()))]
    async fn save_entry(&self, user_id: i64, entry: NewInterest) -> Result<(), SubscriptionError> {
        let company = entry.company.as_ref().to_string();
        // Every name must resolve before the row is touched.
        let company_id = self
            .stores
            .identifiers
            .resolve_or_create(IdentifierKind::Company, &company, None)
            .await
            .map_err(|source| SubscriptionError::Resolution {
                company: company.clone(),
                source,
            })?;
        let incoming = self
            .resolve_interests(company_id, &entry.career_links, &entry.roles)
            .await
            .map_err(|source| SubscriptionError::Resolution {
                company: company.clone(),
                source,
            })?;

        let existing = self
            .stores
            .subscriptions
            .get(user_id, company_id)
            .await
            .context("Failed to fetch the existing subscription.")?;
        let now = Utc::now();
        let written = match existing {
            None => {
                self.stores
                    .subscriptions
                    .insert(&StoredSubscription {
                        user_id,
                        company_id,
                        interests: incoming,
                        active: true,
                        interest_time: now,
                        version: 0,
                    })
                    .await
            }
            Some(existing) => {
                let interests = merge(Some(&existing.interests), incoming);
                self.stores
                    .subscriptions
                    .update(&StoredSubscription {
                        interests,
                        interest_time: now,
                        ..existing
                    })
                    .await
            }
        };
        written.map_err(|e| write_failure(&company, e))
    }

    /// Overwrites the fields present in each entry. Companies must already be subscribed.
    #[tracing::instrument(name = "Update subscriptions", skip(self, entries), fields(entries = entries.len()))]
    pub async fn update(
        &self,
        email: &UserEmail,
        entries: Vec<InterestUpdate>,
    ) -> Result<BatchOutcome, SubscriptionError> {
        let user_id = self.user_id(email).await?;
        let mut outcome = BatchOutcome::default();
        for entry in entries {
            let company = entry.company.as_ref().to_string();
            let result = self.update_entry(user_id, entry).await;
            outcome.record(company, result);
        }
        Ok(outcome)
    }

    #[tracing::instrument(name = "Update subscription entry", skip(self, entry), fields(company = %entry.company.as_ref()))]
    async fn update_entry(
        &self,
        user_id: i64,
        entry: InterestUpdate,
    ) -> Result<(), SubscriptionError> {
        let company = entry.company.as_ref().to_string();
        let company_id = self.existing_company_id(&entry.company).await?;
        let existing = self
            .stores
            .subscriptions
            .get(user_id, company_id)
            .await
            .context("Failed to fetch the existing subscription.")?
            .ok_or_else(|| SubscriptionError::NotSubscribed(company.clone()))?;

        let patch = self
            .resolve_patch(company_id, entry)
            .await
            .map_err(|source| SubscriptionError::Resolution {
                company: company.clone(),
                source,
            })?;
        let (interests, active) = patch.apply(existing.interests.clone(), existing.active);
        self.stores
            .subscriptions
            .update(&StoredSubscription {
                interests,
                active,
                interest_time: Utc::now(),
                ..existing
            })
            .await
            .map_err(|e| write_failure(&company, e))
    }

    /// Removes the user's subscription to each named company.
    #[tracing::instrument(name = "Delete subscriptions", skip(self, companies), fields(entries = companies.len()))]
    pub async fn delete(
        &self,
        email: &UserEmail,
        companies: Vec<CompanyName>,
    ) -> Result<BatchOutcome, SubscriptionError> {
        let user_id = self.user_id(email).await?;
        let mut outcome = BatchOutcome::default();
        for company in companies {
            let result = self.delete_entry(user_id, &company).await;
            outcome.record(company.as_ref().to_string(), result);
        }
        Ok(outcome)
    }

    async fn delete_entry(
        &self,
        user_id: i64,
        company: &CompanyName,
    ) -> Result<(), SubscriptionError> {
        let company_id = self.existing_company_id(company).await?;
        let deleted = self
            .stores
            .subscriptions
            .delete(user_id, company_id)
            .await
            .context("Failed to delete the subscription.")?;
        match deleted {
            true => Ok(()),
            false => Err(SubscriptionError::NotSubscribed(
                company.as_ref().to_string(),
            )),
        }
    }

    #[tracing::instrument(name = "List subscriptions", skip(self))]
    pub async fn list(&self, email: &UserEmail) -> Result<Vec<SubscriptionView>, SubscriptionError> {
        let user_id = self.user_id(email).await?;
        let rows = self
            .stores
            .subscriptions
            .list_for_user(user_id)
            .await
            .context("Failed to list the user's subscriptions.")?;

        let identifiers = &self.stores.identifiers;
        let mut views = Vec::with_capacity(rows.len());
        for row in rows {
            let company_name = identifiers
                .names(IdentifierKind::Company, &[row.company_id])
                .await
                .context("Failed to fetch the company name.")?
                .into_iter()
                .next()
                .context("The company name is missing.")?;
            let career_links = identifiers
                .names(IdentifierKind::CareerSite, &row.interests.career_site_ids())
                .await
                .context("Failed to fetch the career links.")?;
            let role_names = identifiers
                .names(IdentifierKind::Role, &row.interests.role_ids())
                .await
                .context("Failed to fetch the role names.")?;
            views.push(SubscriptionView {
                company_name,
                career_links,
                role_names,
                active: row.active,
                interest_time: row.interest_time,
            });
        }
        Ok(views)
    }

    #[tracing::instrument(name = "Load subscription catalog", skip(self))]
    pub async fn catalog(&self) -> Result<Catalog, SubscriptionError> {
        let catalog = self
            .stores
            .identifiers
            .catalog()
            .await
            .context("Failed to load the subscription catalog.")?;
        Ok(catalog)
    }

    async fn existing_company_id(&self, company: &CompanyName) -> Result<i64, SubscriptionError> {
        self.stores
            .identifiers
            .find_id(IdentifierKind::Company, company.as_ref())
            .await
            .context("Failed to look up the company.")?
            .ok_or_else(|| SubscriptionError::UnknownCompany(company.as_ref().to_string()))
    }

    async fn resolve_interests(
        &self,
        company_id: i64,
        career_links: &[CareerLink],
        roles: &[RoleName],
    ) -> Result<InterestSet, StoreError> {
        Ok(InterestSet {
            career_sites: self.resolve_career_links(company_id, career_links).await?,
            roles: self.resolve_roles(roles).await?,
        })
    }

    async fn resolve_patch(
        &self,
        company_id: i64,
        entry: InterestUpdate,
    ) -> Result<InterestPatch, StoreError> {
        let career_sites = match entry.career_links {
            FieldUpdate::Keep => FieldUpdate::Keep,
            FieldUpdate::Replace(links) => {
                FieldUpdate::Replace(self.resolve_career_links(company_id, &links).await?)
            }
        };
        let roles = match entry.roles {
            FieldUpdate::Keep => FieldUpdate::Keep,
            FieldUpdate::Replace(roles) => FieldUpdate::Replace(self.resolve_roles(&roles).await?),
        };
        Ok(InterestPatch {
            career_sites,
            roles,
            active: entry.active,
        })
    }

    async fn resolve_career_links(
        &self,
        company_id: i64,
        links: &[CareerLink],
    ) -> Result<BTreeSet<i64>, StoreError> {
        let mut ids = BTreeSet::new();
        for link in links {
            let id = self
                .stores
                .identifiers
                .resolve_or_create(IdentifierKind::CareerSite, link.as_ref(), Some(company_id))
                .await?;
            ids.insert(id);
        }
        Ok(ids)
    }

    async fn resolve_roles(&self, roles: &[RoleName]) -> Result<BTreeSet<i64>, StoreError> {
        let mut ids = BTreeSet::new();
        for role in roles {
            let id = self
                .stores
                .identifiers
                .resolve_or_create(IdentifierKind::Role, role.as_ref(), None)
                .await?;
            ids.insert(id);
        }
        Ok(ids)
    }
}
