//! The per-company interest set of a subscription and the two ways it changes:
//! additive merge on save, field-wise replace on update.

use std::collections::BTreeSet;

/// Career-site and role identifiers a user tracks for one company.
///
/// Both fields are sets, so an id can never appear twice. `BTreeSet` keeps the
/// order deterministic whenever the ids are written out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestSet {
    pub career_sites: BTreeSet<i64>,
    pub roles: BTreeSet<i64>,
}

impl InterestSet {
    pub fn new(
        career_sites: impl IntoIterator<Item = i64>,
        roles: impl IntoIterator<Item = i64>,
    ) -> Self {
        Self {
            career_sites: career_sites.into_iter().collect(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Field-wise union of `self` and `incoming`.
    pub fn merge(&self, incoming: &InterestSet) -> InterestSet {
        InterestSet {
            career_sites: self.career_sites.union(&incoming.career_sites).copied().collect(),
            roles: self.roles.union(&incoming.roles).copied().collect(),
        }
    }

    pub fn career_site_ids(&self) -> Vec<i64> {
        self.career_sites.iter().copied().collect()
    }

    pub fn role_ids(&self) -> Vec<i64> {
        self.roles.iter().copied().collect()
    }
}

/// Combines a stored interest set with newly submitted ids.
///
/// Without a stored set the incoming one is taken verbatim.
pub fn merge(existing: Option<&InterestSet>, incoming: InterestSet) -> InterestSet {
    match existing {
        Some(existing) => existing.merge(&incoming),
        None => incoming,
    }
}

/// A single field of an explicit update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Keep,
    Replace(T),
}

impl<T> FieldUpdate<T> {
    pub fn apply(self, current: T) -> T {
        match self {
            FieldUpdate::Keep => current,
            FieldUpdate::Replace(value) => value,
        }
    }
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::Keep
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FieldUpdate::Replace(value),
            None => FieldUpdate::Keep,
        }
    }
}

/// Replace-mode changes to one subscription. Fields left at `Keep` are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestPatch {
    pub career_sites: FieldUpdate<BTreeSet<i64>>,
    pub roles: FieldUpdate<BTreeSet<i64>>,
    pub active: FieldUpdate<bool>,
}

impl InterestPatch {
    pub fn apply(self, interests: InterestSet, active: bool) -> (InterestSet, bool) {
        let interests = InterestSet {
            career_sites: self.career_sites.apply(interests.career_sites),
            roles: self.roles.apply(interests.roles),
        };
        (interests, self.active.apply(active))
    }
}
