//! View Pipeline: partition, filter, sort and paginate the roster.
//!
//! Derivation is pure. Stages always run in that order, each one consuming the
//! previous stage's output.

use serde::Serialize;
use shared::domain::{SortDirection, SortField, UserRecord};

use crate::{classification::ClassificationSet, config::PageOverflow};

/// User-controlled inputs to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewFilterState {
    pub query: String,
    pub sort_field: Option<SortField>,
    pub direction: SortDirection,
    /// 1-based.
    pub page: usize,
}

impl Default for ViewFilterState {
    fn default() -> Self {
        Self {
            query: String::new(),
            sort_field: None,
            direction: SortDirection::Ascending,
            page: 1,
        }
    }
}

impl ViewFilterState {
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Same field flips the direction, a new field starts ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == Some(field) {
            self.direction = self.direction.flipped();
        } else {
            self.sort_field = Some(field);
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewPage {
    pub records: Vec<UserRecord>,
    pub page: usize,
    pub page_count: usize,
    pub total_matches: usize,
    pub page_size: usize,
}

pub fn matches_query(record: &UserRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let folded = query.to_lowercase();
    record.name.to_lowercase().contains(&folded)
        || record.email.to_lowercase().contains(&folded)
        || record.mobile_number.contains(query)
}

/// Partition and filter stages.
pub fn visible_matches<'a>(
    roster: &'a [UserRecord],
    liked: &ClassificationSet,
    query: &str,
) -> Vec<&'a UserRecord> {
    roster
        .iter()
        .filter(|record| !liked.contains(&record.id))
        .filter(|record| matches_query(record, query))
        .collect()
}

/// Stable, so records with equal keys keep their filtered order.
pub fn sort_records(records: &mut [&UserRecord], field: Option<SortField>, direction: SortDirection) {
    let Some(field) = field else {
        return;
    };
    records.sort_by(|a, b| {
        let ordering = a.field(field).cmp(b.field(field));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

pub fn derive_page(
    roster: &[UserRecord],
    liked: &ClassificationSet,
    filter: &ViewFilterState,
    page_size: usize,
    overflow: PageOverflow,
) -> ViewPage {
    let mut matches = visible_matches(roster, liked, &filter.query);
    sort_records(&mut matches, filter.sort_field, filter.direction);

    let total_matches = matches.len();
    let page_count = page_count(total_matches, page_size);
    let requested = filter.page.max(1);
    let page = match overflow {
        PageOverflow::Clamp if page_count > 0 => requested.min(page_count),
        _ => requested,
    };

    let start = (page - 1).saturating_mul(page_size);
    let records = matches
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    ViewPage {
        records,
        page,
        page_count,
        total_matches,
        page_size,
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
