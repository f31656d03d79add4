//! The filter engine.
//!
//! Applying a `FilterSpec` is a pure function `Dataset × FilterSpec →
//! Dataset`: the result is a fresh dataset whose records are a stable
//! subsequence of the input. No rows match → an empty dataset, not an
//! error. Malformed parameters are rejected before any filtering happens.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::dataset::Dataset;
use crate::error::{EngineError, EngineResult};

/// Branch narrowing: either everything, or a single named branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchFilter {
    All,
    Only(String),
}

/// The full filter state of one dashboard interaction.
#[derive(Clone, Debug)]
pub struct FilterSpec {
    /// Inclusive calendar-date lower bound.
    pub start: NaiveDate,
    /// Inclusive calendar-date upper bound.
    pub end: NaiveDate,
    /// Allowed menu categories. An empty set matches nothing — it is an
    /// explicit "deselect everything", not an absent filter.
    pub categories: BTreeSet<String>,
    pub branch: BranchFilter,
}

impl FilterSpec {
    /// A spec that passes every record of the given dataset: full date
    /// range, every category, all branches. Mirrors the dashboard's
    /// default everything-selected state.
    pub fn unrestricted(dataset: &Dataset) -> Self {
        let (start, end) = dataset
            .date_range()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        Self {
            start,
            end,
            categories: dataset.categories().iter().cloned().collect(),
            branch: BranchFilter::All,
        }
    }
}

/// Narrow a dataset by date range, category set, and branch.
///
/// The branch parameter is ignored when the data holds a single branch,
/// matching the dashboard behavior of hiding the branch selector for
/// single-site operations.
pub fn apply(dataset: &Dataset, spec: &FilterSpec) -> EngineResult<Dataset> {
    if spec.start > spec.end {
        return Err(EngineError::InvalidFilter {
            reason: format!("start date {} is after end date {}", spec.start, spec.end),
        });
    }

    let single_branch = dataset.branches().len() <= 1;
    let records: Vec<_> = dataset
        .records()
        .iter()
        .filter(|r| {
            let date = r.sale_date();
            if date < spec.start || date > spec.end {
                return false;
            }
            if !spec.categories.contains(&r.menu_category) {
                return false;
            }
            if !single_branch {
                if let BranchFilter::Only(branch) = &spec.branch {
                    if &r.branch != branch {
                        return false;
                    }
                }
            }
            true
        })
        .cloned()
        .collect();

    log::debug!(
        "filter kept {} of {} records",
        records.len(),
        dataset.record_count()
    );
    Ok(Dataset::from_records(records))
}
