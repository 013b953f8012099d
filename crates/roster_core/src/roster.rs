//! Roster Store: the user list as last fetched from the directory.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use shared::domain::{UserId, UserRecord};
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    records: Vec<UserRecord>,
    refreshed_at: Option<DateTime<Utc>>,
    applied_fetch: u64,
}

impl RosterStore {
    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, user_id: &UserId) -> Option<&UserRecord> {
        self.records.iter().find(|record| &record.id == user_id)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.get(user_id).is_some()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Replaces the contents with the result of fetch number `fetch_seq`.
    ///
    /// Returns `false` without touching the store when a newer fetch has
    /// already been applied. Duplicate identifiers keep their first occurrence.
    pub(crate) fn replace(&mut self, fetch_seq: u64, records: Vec<UserRecord>) -> bool {
        if fetch_seq <= self.applied_fetch {
            return false;
        }

        let mut seen = HashSet::with_capacity(records.len());
        let mut unique = Vec::with_capacity(records.len());
        for record in records {
            if seen.insert(record.id.clone()) {
                unique.push(record);
            } else {
                warn!("roster: dropping duplicate user id={}", record.id);
            }
        }

        self.records = unique;
        self.refreshed_at = Some(Utc::now());
        self.applied_fetch = fetch_seq;
        true
    }
}

#[cfg(test)]
#[path = "tests/roster_tests.rs"]
mod tests;
