use crate::domain::UserEmail;
use crate::store::{
    Catalog, IdentifierKind, IdentifierStore, StoreError, StoredSubscription, SubscriptionStore,
    UserStore,
};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

/// A process-local store. Ids come from a single counter shared by every kind.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: i64,
    users: HashMap<String, i64>,
    ids: HashMap<(IdentifierKind, String), i64>,
    names: BTreeMap<i64, (IdentifierKind, String)>,
    career_site_companies: HashMap<i64, i64>,
    subscriptions: BTreeMap<(i64, i64), StoredSubscription>,
}

impl State {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn names_of(&self, kind: IdentifierKind) -> impl Iterator<Item = (i64, &str)> + '_ {
        self.names
            .iter()
            .filter(move |(_, (k, _))| *k == kind)
            .map(|(id, (_, name))| (*id, name.as_str()))
    }
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore::default()
    }

    /// Registers an account. Sign-up itself lives outside this service.
    pub fn add_user(&self, email: &str) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(id) = state.users.get(email) {
            return *id;
        }
        let id = state.allocate_id();
        state.users.insert(email.to_string(), id);
        id
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unexpected(anyhow!("The in-memory store lock was poisoned.")))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user_id(&self, email: &UserEmail) -> Result<Option<i64>, StoreError> {
        Ok(self.state()?.users.get(email.as_ref()).copied())
    }
}

#[async_trait]
impl IdentifierStore for InMemoryStore {
    async fn resolve_or_create(
        &self,
        kind: IdentifierKind,
        name: &str,
        parent: Option<i64>,
    ) -> Result<i64, StoreError> {
        let mut state = self.state()?;
        if let Some(id) = state.ids.get(&(kind, name.to_string())).copied() {
            if let (IdentifierKind::CareerSite, Some(company_id)) = (kind, parent) {
                if state.career_site_companies.get(&id) != Some(&company_id) {
                    return Err(StoreError::Rejected(format!(
                        "Career link '{}' belongs to another company.",
                        name
                    )));
                }
            }
            return Ok(id);
        }
        let company_id = match (kind, parent) {
            (IdentifierKind::CareerSite, Some(company_id)) => Some(company_id),
            (IdentifierKind::CareerSite, None) => {
                return Err(StoreError::Unexpected(anyhow!(
                    "Career site '{}' has no owning company.",
                    name
                )))
            }
            _ => None,
        };
        let id = state.allocate_id();
        state.ids.insert((kind, name.to_string()), id);
        state.names.insert(id, (kind, name.to_string()));
        if let Some(company_id) = company_id {
            state.career_site_companies.insert(id, company_id);
        }
        Ok(id)
    }

    async fn find_id(&self, kind: IdentifierKind, name: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.state()?.ids.get(&(kind, name.to_string())).copied())
    }

    async fn names(&self, kind: IdentifierKind, ids: &[i64]) -> Result<Vec<String>, StoreError> {
        let state = self.state()?;
        ids.iter()
            .map(|id| match state.names.get(id) {
                Some((k, name)) if *k == kind => Ok(name.clone()),
                _ => Err(StoreError::Unexpected(anyhow!(
                    "There is no {} with id {}.",
                    kind.as_str(),
                    id
                ))),
            })
            .collect()
    }

    async fn catalog(&self) -> Result<Catalog, StoreError> {
        let state = self.state()?;
        let mut catalog = Catalog::default();
        for (company_id, company) in state.names_of(IdentifierKind::Company) {
            let links = state
                .names_of(IdentifierKind::CareerSite)
                .filter(|(id, _)| state.career_site_companies.get(id) == Some(&company_id))
                .map(|(_, link)| link.to_string())
                .collect();
            catalog.companies.insert(company.to_string(), links);
        }
        catalog.roles = state
            .names_of(IdentifierKind::Role)
            .map(|(_, role)| role.to_string())
            .collect();
        Ok(catalog)
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn get(
        &self,
        user_id: i64,
        company_id: i64,
    ) -> Result<Option<StoredSubscription>, StoreError> {
        Ok(self.state()?.subscriptions.get(&(user_id, company_id)).cloned())
    }

    async fn insert(&self, subscription: &StoredSubscription) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let key = (subscription.user_id, subscription.company_id);
        if state.subscriptions.contains_key(&key) {
            return Err(StoreError::Conflict);
        }
        state.subscriptions.insert(key, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &StoredSubscription) -> Result<(), StoreError> {
        let mut state = self.state()?;
        let key = (subscription.user_id, subscription.company_id);
        match state.subscriptions.get_mut(&key) {
            Some(current) if current.version == subscription.version => {
                *current = StoredSubscription {
                    version: subscription.version + 1,
                    ..subscription.clone()
                };
                Ok(())
            }
            _ => Err(StoreError::Conflict),
        }
    }

    async fn delete(&self, user_id: i64, company_id: i64) -> Result<bool, StoreError> {
        Ok(self
            .state()?
            .subscriptions
            .remove(&(user_id, company_id))
            .is_some())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<StoredSubscription>, StoreError> {
        let mut rows: Vec<StoredSubscription> = self
            .state()?
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.company_id);
        Ok(rows)
    }
}
