//! The aggregation library: pure query functions over a filtered dataset.
//!
//! Every function here is a single-pass fold from records into group
//! accumulators, finalized into derived ratios. None mutate their input,
//! and every one returns a well-formed zero/empty result for an empty
//! dataset. All per-menu rankings are derived from
//! `comprehensive_menu_analysis` so grouping rules agree everywhere.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate, Timelike};
use serde::Serialize;

use crate::dataset::Dataset;

/// Fixed Monday→Sunday labels used by the weekday pattern and the heatmap.
pub const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

// ---------------------------------------------------------------------------
// Aggregate row types
// ---------------------------------------------------------------------------

/// Per-menu aggregate, the shared basis for every ranking.
#[derive(Clone, Debug, Serialize)]
pub struct MenuStat {
    pub menu: String,
    /// Category of the menu's first-seen record.
    pub category: String,
    pub total_qty: u64,
    pub total_revenue: f64,
    pub total_margin: f64,
    /// Margin per unit sold: `total_margin / total_qty`, 0 when no units.
    pub avg_margin: f64,
    /// `total_margin / total_revenue × 100`, 0 when no revenue.
    pub margin_percentage: f64,
    /// Mean of the per-row COGS percentages.
    pub avg_cogs_pct: f64,
}

/// Per-category aggregate.
#[derive(Clone, Debug, Serialize)]
pub struct CategoryStat {
    pub category: String,
    pub total_qty: u64,
    pub total_revenue: f64,
    pub total_cogs: f64,
    pub total_margin: f64,
    pub avg_cogs_pct: f64,
    pub margin_percentage: f64,
}

/// Dataset-wide totals for the overview cards.
#[derive(Clone, Debug, Serialize)]
pub struct OverviewTotals {
    pub records: usize,
    pub total_revenue: f64,
    pub total_cogs: f64,
    pub total_margin: f64,
    /// `total_margin / total_revenue × 100`, 0 when no revenue.
    pub margin_pct: f64,
    /// Mean revenue per transaction row.
    pub avg_transaction: f64,
    /// Mean of the per-row COGS percentages.
    pub avg_cogs_pct: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct HourlyRevenue {
    pub hour: u32,
    pub revenue: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct WeekdayPattern {
    pub day: &'static str,
    /// Mean revenue per calendar date observed for this weekday.
    pub avg_revenue: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct WeeklyRevenue {
    /// Monday of the ISO week, keeping the series chronological across
    /// year boundaries.
    pub week_start: NaiveDate,
    pub revenue: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct DailyCogs {
    pub date: NaiveDate,
    pub cogs: f64,
    pub revenue: f64,
}

/// Revenue summed per (weekday, hour) cell.
#[derive(Clone, Debug, Serialize)]
pub struct SalesHeatmap {
    /// Rows are Monday→Sunday, columns are hour 0–23. Always 7×24.
    pub cells: [[f64; 24]; 7],
}

impl SalesHeatmap {
    pub fn get(&self, day: usize, hour: usize) -> f64 {
        self.cells[day][hour]
    }
}

/// Per-date series for one menu's drill-down view.
#[derive(Clone, Debug, Serialize)]
pub struct MenuDaily {
    pub date: NaiveDate,
    pub qty: u64,
    pub revenue: f64,
}

/// One menu's aggregate plus its daily trend.
#[derive(Clone, Debug, Serialize)]
pub struct MenuDetail {
    pub stat: MenuStat,
    pub daily: Vec<MenuDaily>,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Division with the zero-denominator guard: 0 instead of NaN or infinity.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Descending float order with the menu-name-ascending tie break that keeps
/// every ranking deterministic.
fn rank_desc(a_key: f64, b_key: f64, a_menu: &str, b_menu: &str) -> Ordering {
    b_key
        .partial_cmp(&a_key)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_menu.cmp(b_menu))
}

// ---------------------------------------------------------------------------
// Menu-level aggregation
// ---------------------------------------------------------------------------

/// Group by menu name and derive the full per-menu stat set, in first-seen
/// menu order.
pub fn comprehensive_menu_analysis(dataset: &Dataset) -> Vec<MenuStat> {
    struct Acc {
        category: String,
        qty: u64,
        revenue: f64,
        margin: f64,
        cogs_pct_sum: f64,
        rows: usize,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Acc> = HashMap::new();
    for r in dataset.records() {
        let acc = groups.entry(r.menu_name.clone()).or_insert_with(|| {
            order.push(r.menu_name.clone());
            Acc {
                category: r.menu_category.clone(),
                qty: 0,
                revenue: 0.0,
                margin: 0.0,
                cogs_pct_sum: 0.0,
                rows: 0,
            }
        });
        acc.qty += r.quantity;
        acc.revenue += r.total_revenue;
        acc.margin += r.margin;
        acc.cogs_pct_sum += r.cogs_pct;
        acc.rows += 1;
    }

    order
        .into_iter()
        .map(|menu| {
            let acc = &groups[&menu];
            MenuStat {
                category: acc.category.clone(),
                total_qty: acc.qty,
                total_revenue: acc.revenue,
                total_margin: acc.margin,
                avg_margin: ratio(acc.margin, acc.qty as f64),
                margin_percentage: ratio(acc.margin, acc.revenue) * 100.0,
                avg_cogs_pct: ratio(acc.cogs_pct_sum, acc.rows as f64),
                menu,
            }
        })
        .collect()
}

/// Top n menus by units sold.
pub fn top_performing(dataset: &Dataset, n: usize) -> Vec<MenuStat> {
    let mut stats = comprehensive_menu_analysis(dataset);
    stats.sort_by(|a, b| {
        b.total_qty
            .cmp(&a.total_qty)
            .then_with(|| a.menu.cmp(&b.menu))
    });
    stats.truncate(n);
    stats
}

/// Top n menus by average margin per unit.
pub fn most_profitable(dataset: &Dataset, n: usize) -> Vec<MenuStat> {
    let mut stats = comprehensive_menu_analysis(dataset);
    stats.sort_by(|a, b| rank_desc(a.avg_margin, b.avg_margin, &a.menu, &b.menu));
    stats.truncate(n);
    stats
}

/// Top n menus by average COGS percentage, worst first.
pub fn high_cogs_menus(dataset: &Dataset, n: usize) -> Vec<MenuStat> {
    let mut stats = comprehensive_menu_analysis(dataset);
    stats.sort_by(|a, b| rank_desc(a.avg_cogs_pct, b.avg_cogs_pct, &a.menu, &b.menu));
    stats.truncate(n);
    stats
}

/// Top n menus by average COGS percentage, best first.
pub fn low_cogs_menus(dataset: &Dataset, n: usize) -> Vec<MenuStat> {
    let mut stats = comprehensive_menu_analysis(dataset);
    stats.sort_by(|a, b| rank_desc(b.avg_cogs_pct, a.avg_cogs_pct, &a.menu, &b.menu));
    stats.truncate(n);
    stats
}

/// Group by menu category, in first-seen category order.
pub fn category_breakdown(dataset: &Dataset) -> Vec<CategoryStat> {
    struct Acc {
        qty: u64,
        revenue: f64,
        cogs: f64,
        margin: f64,
        cogs_pct_sum: f64,
        rows: usize,
    }

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Acc> = HashMap::new();
    for r in dataset.records() {
        let acc = groups.entry(r.menu_category.clone()).or_insert_with(|| {
            order.push(r.menu_category.clone());
            Acc {
                qty: 0,
                revenue: 0.0,
                cogs: 0.0,
                margin: 0.0,
                cogs_pct_sum: 0.0,
                rows: 0,
            }
        });
        acc.qty += r.quantity;
        acc.revenue += r.total_revenue;
        acc.cogs += r.cogs_total;
        acc.margin += r.margin;
        acc.cogs_pct_sum += r.cogs_pct;
        acc.rows += 1;
    }

    order
        .into_iter()
        .map(|category| {
            let acc = &groups[&category];
            CategoryStat {
                total_qty: acc.qty,
                total_revenue: acc.revenue,
                total_cogs: acc.cogs,
                total_margin: acc.margin,
                avg_cogs_pct: ratio(acc.cogs_pct_sum, acc.rows as f64),
                margin_percentage: ratio(acc.margin, acc.revenue) * 100.0,
                category,
            }
        })
        .collect()
}

/// Dataset-wide totals for the overview cards.
pub fn overview_totals(dataset: &Dataset) -> OverviewTotals {
    let records = dataset.record_count();
    let total_revenue: f64 = dataset.records().iter().map(|r| r.total_revenue).sum();
    let total_cogs: f64 = dataset.records().iter().map(|r| r.cogs_total).sum();
    let total_margin: f64 = dataset.records().iter().map(|r| r.margin).sum();
    let cogs_pct_sum: f64 = dataset.records().iter().map(|r| r.cogs_pct).sum();

    OverviewTotals {
        records,
        total_revenue,
        total_cogs,
        total_margin,
        margin_pct: ratio(total_margin, total_revenue) * 100.0,
        avg_transaction: ratio(total_revenue, records as f64),
        avg_cogs_pct: ratio(cogs_pct_sum, records as f64),
    }
}

/// One menu's aggregate plus its per-date qty/revenue series, or `None`
/// when the menu does not appear in the dataset.
pub fn menu_detail(dataset: &Dataset, menu: &str) -> Option<MenuDetail> {
    let stat = comprehensive_menu_analysis(dataset)
        .into_iter()
        .find(|s| s.menu == menu)?;

    let mut by_date: BTreeMap<NaiveDate, (u64, f64)> = BTreeMap::new();
    for r in dataset.records().iter().filter(|r| r.menu_name == menu) {
        let cell = by_date.entry(r.sale_date()).or_insert((0, 0.0));
        cell.0 += r.quantity;
        cell.1 += r.total_revenue;
    }
    let daily = by_date
        .into_iter()
        .map(|(date, (qty, revenue))| MenuDaily { date, qty, revenue })
        .collect();

    Some(MenuDetail { stat, daily })
}

// ---------------------------------------------------------------------------
// Temporal aggregation
// ---------------------------------------------------------------------------

/// Revenue per calendar date, chronological. Dates with no transactions are
/// absent — no gap-filling.
pub fn daily_sales_trend(dataset: &Dataset) -> Vec<DailyRevenue> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in dataset.records() {
        *by_date.entry(r.sale_date()).or_insert(0.0) += r.total_revenue;
    }
    by_date
        .into_iter()
        .map(|(date, revenue)| DailyRevenue { date, revenue })
        .collect()
}

/// Revenue per hour-of-day across all dates. All 24 hours are present,
/// zero where no transactions occurred.
pub fn hourly_sales_pattern(dataset: &Dataset) -> Vec<HourlyRevenue> {
    let mut hours = [0.0f64; 24];
    for r in dataset.records() {
        hours[r.sale_timestamp.hour() as usize] += r.total_revenue;
    }
    hours
        .iter()
        .enumerate()
        .map(|(hour, &revenue)| HourlyRevenue {
            hour: hour as u32,
            revenue,
        })
        .collect()
}

/// Mean revenue per weekday across the calendar dates observed for that
/// weekday. Always ordered Monday→Sunday, zero for unobserved days.
pub fn daily_sales_pattern(dataset: &Dataset) -> Vec<WeekdayPattern> {
    // Sum per (weekday, date) first so the mean is across calendar dates,
    // not across individual transaction rows.
    let mut by_day_date: BTreeMap<(usize, NaiveDate), f64> = BTreeMap::new();
    for r in dataset.records() {
        let idx = r.sale_timestamp.weekday().num_days_from_monday() as usize;
        *by_day_date.entry((idx, r.sale_date())).or_insert(0.0) += r.total_revenue;
    }

    let mut totals = [0.0f64; 7];
    let mut date_counts = [0usize; 7];
    for ((idx, _), revenue) in &by_day_date {
        totals[*idx] += revenue;
        date_counts[*idx] += 1;
    }

    DAY_NAMES
        .iter()
        .enumerate()
        .map(|(idx, &day)| WeekdayPattern {
            day,
            avg_revenue: ratio(totals[idx], date_counts[idx] as f64),
        })
        .collect()
}

/// Revenue per ISO week, keyed by the Monday of each week, chronological.
pub fn weekly_trend(dataset: &Dataset) -> Vec<WeeklyRevenue> {
    let mut by_week: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in dataset.records() {
        let date = r.sale_date();
        let week_start = date - Days::new(u64::from(date.weekday().num_days_from_monday()));
        *by_week.entry(week_start).or_insert(0.0) += r.total_revenue;
    }
    by_week
        .into_iter()
        .map(|(week_start, revenue)| WeeklyRevenue {
            week_start,
            revenue,
        })
        .collect()
}

/// 7×24 revenue matrix over (weekday, hour), zero-filled.
pub fn sales_heatmap(dataset: &Dataset) -> SalesHeatmap {
    let mut cells = [[0.0f64; 24]; 7];
    for r in dataset.records() {
        let day = r.sale_timestamp.weekday().num_days_from_monday() as usize;
        let hour = r.sale_timestamp.hour() as usize;
        cells[day][hour] += r.total_revenue;
    }
    SalesHeatmap { cells }
}

// ---------------------------------------------------------------------------
// COGS aggregation
// ---------------------------------------------------------------------------

/// COGS against revenue per calendar date, chronological.
pub fn cogs_trend(dataset: &Dataset) -> Vec<DailyCogs> {
    let mut by_date: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for r in dataset.records() {
        let cell = by_date.entry(r.sale_date()).or_insert((0.0, 0.0));
        cell.0 += r.cogs_total;
        cell.1 += r.total_revenue;
    }
    by_date
        .into_iter()
        .map(|(date, (cogs, revenue))| DailyCogs {
            date,
            cogs,
            revenue,
        })
        .collect()
}

/// COGS efficiency score in [0, 100]: `100 − mean(cogs_pct)`, clamped.
///
/// Heuristic: the mean is unweighted, so two datasets with identical mean
/// COGS percentages score the same regardless of how revenue is
/// distributed. Kept as-is deliberately; a revenue-weighted variant would
/// be a behavior change. Returns 0 for an empty dataset.
pub fn cogs_efficiency(dataset: &Dataset) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    let mean: f64 = dataset.records().iter().map(|r| r.cogs_pct).sum::<f64>()
        / dataset.record_count() as f64;
    (100.0 - mean).clamp(0.0, 100.0)
}
