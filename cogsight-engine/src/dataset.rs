//! The canonical in-memory dataset.
//!
//! Owned by the session that loaded it and never mutated in place: every
//! filter produces a fresh `Dataset`. Dataset-wide scalars (record count,
//! timestamp bounds, distinct categories and branches) are derived once at
//! construction.

use chrono::{NaiveDate, NaiveDateTime};

use crate::record::SaleRecord;

/// An ordered, immutable sequence of canonical sale records.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<SaleRecord>,
    min_timestamp: Option<NaiveDateTime>,
    max_timestamp: Option<NaiveDateTime>,
    /// Distinct menu categories in first-seen order.
    categories: Vec<String>,
    /// Distinct branches in first-seen order.
    branches: Vec<String>,
}

impl Dataset {
    pub(crate) fn from_records(records: Vec<SaleRecord>) -> Self {
        let min_timestamp = records.iter().map(|r| r.sale_timestamp).min();
        let max_timestamp = records.iter().map(|r| r.sale_timestamp).max();

        let mut categories: Vec<String> = Vec::new();
        let mut branches: Vec<String> = Vec::new();
        for r in &records {
            if !categories.contains(&r.menu_category) {
                categories.push(r.menu_category.clone());
            }
            if !branches.contains(&r.branch) {
                branches.push(r.branch.clone());
            }
        }

        Self {
            records,
            min_timestamp,
            max_timestamp,
            categories,
            branches,
        }
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn min_timestamp(&self) -> Option<NaiveDateTime> {
        self.min_timestamp
    }

    pub fn max_timestamp(&self) -> Option<NaiveDateTime> {
        self.max_timestamp
    }

    /// Calendar-date bounds of the data, `None` for an empty dataset.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.min_timestamp?.date(), self.max_timestamp?.date()))
    }

    /// Distinct menu categories in first-seen order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Distinct branches in first-seen order.
    pub fn branches(&self) -> &[String] {
        &self.branches
    }
}
