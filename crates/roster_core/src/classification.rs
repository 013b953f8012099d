//! Classification Set: users currently marked liked.

use std::collections::HashMap;

use shared::domain::{UserId, UserRecord};

use crate::roster::RosterStore;

#[derive(Debug, Clone, Default)]
pub struct ClassificationSet {
    records: HashMap<UserId, UserRecord>,
    // like order, for presenting the liked list
    order: Vec<UserId>,
}

impl ClassificationSet {
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.records.contains_key(user_id)
    }

    /// Returns `false` if the identifier was already present.
    pub fn add(&mut self, record: UserRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.order.push(record.id.clone());
        self.records.insert(record.id.clone(), record);
        true
    }

    /// Returns `false` if the identifier was absent.
    pub fn remove(&mut self, user_id: &UserId) -> bool {
        if self.records.remove(user_id).is_none() {
            return false;
        }
        self.order.retain(|id| id != user_id);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Liked records, oldest like first.
    pub fn records(&self) -> impl Iterator<Item = &UserRecord> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Drops entries whose identifier is missing from `roster`, returning them.
    pub fn retain_present(&mut self, roster: &RosterStore) -> Vec<UserId> {
        let stale: Vec<UserId> = self
            .order
            .iter()
            .filter(|id| !roster.contains(id))
            .cloned()
            .collect();
        for id in &stale {
            self.remove(id);
        }
        stale
    }
}

#[cfg(test)]
#[path = "tests/classification_tests.rs"]
mod tests;
