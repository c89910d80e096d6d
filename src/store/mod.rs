//! Persistence seams for users, name identifiers and subscriptions.
//!
//! Everything the core needs from storage goes through the traits below, so the
//! subscription service can run against Postgres or against memory.

mod memory;
mod postgres;

use crate::domain::UserEmail;
use crate::subscription::InterestSet;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    Company,
    CareerSite,
    Role,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Company => "company",
            IdentifierKind::CareerSite => "career site",
            IdentifierKind::Role => "role",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("The record was modified by a concurrent writer.")]
    Conflict,
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// One subscription row.
///
/// `version` is bumped on every successful write; writers hand back the version
/// they read so that a lost update is detected instead of silently applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSubscription {
    pub user_id: i64,
    pub company_id: i64,
    pub interests: InterestSet,
    pub active: bool,
    pub interest_time: DateTime<Utc>,
    pub version: i64,
}

/// Every known company with its career links, and every known role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub companies: BTreeMap<String, Vec<String>>,
    pub roles: Vec<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_id(&self, email: &UserEmail) -> Result<Option<i64>, StoreError>;
}

#[async_trait]
pub trait IdentifierStore: Send + Sync {
    /// Returns the id registered for `name`, registering it first if needed.
    /// Career sites are attached to the `parent` company; a link already owned
    /// by another company is `Rejected`.
    async fn resolve_or_create(
        &self,
        kind: IdentifierKind,
        name: &str,
        parent: Option<i64>,
    ) -> Result<i64, StoreError>;

    async fn find_id(&self, kind: IdentifierKind, name: &str) -> Result<Option<i64>, StoreError>;

    /// Names for `ids`, in the same order. Unknown ids are an error.
    async fn names(&self, kind: IdentifierKind, ids: &[i64]) -> Result<Vec<String>, StoreError>;

    async fn catalog(&self) -> Result<Catalog, StoreError>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn get(
        &self,
        user_id: i64,
        company_id: i64,
    ) -> Result<Option<StoredSubscription>, StoreError>;

    /// Fails with `Conflict` if the (user, company) pair already has a row.
    async fn insert(&self, subscription: &StoredSubscription) -> Result<(), StoreError>;

    /// Overwrites the row only if its version still equals `subscription.version`.
    async fn update(&self, subscription: &StoredSubscription) -> Result<(), StoreError>;

    async fn delete(&self, user_id: i64, company_id: i64) -> Result<bool, StoreError>;

    /// All rows of `user_id`, ordered by company id.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<StoredSubscription>, StoreError>;
}

#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub identifiers: Arc<dyn IdentifierStore>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
}

impl Stores {
    /// Uses one backend for all three concerns.
    pub fn shared<S>(store: Arc<S>) -> Stores
    where
        S: UserStore + IdentifierStore + SubscriptionStore + 'static,
    {
        Stores {
            users: store.clone(),
            identifiers: store.clone(),
            subscriptions: store,
        }
    }
}
