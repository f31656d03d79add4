//! COGS optimization recommendations.
//!
//! A heuristic rule engine over the per-menu aggregate stats. Rules fire
//! independently and each produces zero or one recommendation, so the
//! output list is bounded by the rule count. Every numeric threshold lives
//! in `RecommendConfig` (defaults in `thresholds.rs`).

use std::cmp::Ordering;

use serde::Serialize;

use crate::aggregate::{comprehensive_menu_analysis, MenuStat};
use crate::dataset::Dataset;
use crate::thresholds;
use crate::util::format_amount;

/// Tunable parameters for the recommendation rules.
#[derive(Clone, Debug)]
pub struct RecommendConfig {
    pub high_cogs_threshold_pct: f64,
    pub cogs_saving_estimate_pct: f64,
    pub worst_offender_count: usize,
    pub concentration_top_n: usize,
    pub concentration_threshold_pct: f64,
    pub underperformer_quantile: f64,
    pub underperformer_min_menus: usize,
    pub promo_margin_percentile: f64,
    pub promo_uplift_factor: f64,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            high_cogs_threshold_pct: thresholds::HIGH_COGS_THRESHOLD_PCT,
            cogs_saving_estimate_pct: thresholds::COGS_SAVING_ESTIMATE_PCT,
            worst_offender_count: thresholds::WORST_OFFENDER_COUNT,
            concentration_top_n: thresholds::CONCENTRATION_TOP_N,
            concentration_threshold_pct: thresholds::CONCENTRATION_THRESHOLD_PCT,
            underperformer_quantile: thresholds::UNDERPERFORMER_QUANTILE,
            underperformer_min_menus: thresholds::UNDERPERFORMER_MIN_MENUS,
            promo_margin_percentile: thresholds::PROMO_MARGIN_PERCENTILE,
            promo_uplift_factor: thresholds::PROMO_UPLIFT_FACTOR,
        }
    }
}

/// One actionable recommendation for the report and dashboard.
#[derive(Clone, Debug, Serialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub potential_saving: String,
}

/// Run every rule against the dataset's per-menu stats.
pub fn cogs_optimization_recommendations(
    dataset: &Dataset,
    config: &RecommendConfig,
) -> Vec<Recommendation> {
    let stats = comprehensive_menu_analysis(dataset);
    if stats.is_empty() {
        return Vec::new();
    }

    let mut recommendations = Vec::new();
    if let Some(rec) = high_cogs_rule(&stats, config) {
        recommendations.push(rec);
    }
    if let Some(rec) = concentration_rule(&stats, config) {
        recommendations.push(rec);
    }
    if let Some(rec) = underperformer_rule(&stats, config) {
        recommendations.push(rec);
    }
    if let Some(rec) = hidden_gem_rule(&stats, config) {
        recommendations.push(rec);
    }
    recommendations
}

/// Nearest-rank index for quantile `q` over a sorted slice of `len` items.
fn percentile_index(len: usize, q: f64) -> usize {
    if len == 0 {
        return 0;
    }
    let rank = (q * len as f64).ceil() as usize;
    rank.saturating_sub(1).min(len - 1)
}

fn by_menu_name(ordering: Ordering, a: &MenuStat, b: &MenuStat) -> Ordering {
    ordering.then_with(|| a.menu.cmp(&b.menu))
}

fn join_names(stats: &[&MenuStat]) -> String {
    stats
        .iter()
        .map(|s| s.menu.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rule 1: the worst high-COGS menus average above the threshold.
fn high_cogs_rule(stats: &[MenuStat], config: &RecommendConfig) -> Option<Recommendation> {
    let mut ranked: Vec<&MenuStat> = stats.iter().collect();
    ranked.sort_by(|a, b| {
        by_menu_name(
            b.avg_cogs_pct
                .partial_cmp(&a.avg_cogs_pct)
                .unwrap_or(Ordering::Equal),
            a,
            b,
        )
    });
    ranked.truncate(config.worst_offender_count);

    let mean_cogs =
        ranked.iter().map(|s| s.avg_cogs_pct).sum::<f64>() / ranked.len() as f64;
    if mean_cogs <= config.high_cogs_threshold_pct {
        return None;
    }

    let combined_revenue: f64 = ranked.iter().map(|s| s.total_revenue).sum();
    let saving = combined_revenue * config.cogs_saving_estimate_pct / 100.0;

    Some(Recommendation {
        title: "Reduce COGS on high-cost menus".to_string(),
        description: format!(
            "These menus average {:.1}% COGS, above the {:.0}% target: {}. \
             Renegotiate ingredient pricing or review portion sizes.",
            mean_cogs,
            config.high_cogs_threshold_pct,
            join_names(&ranked),
        ),
        potential_saving: format!(
            "~{} ({:.0}% of their combined revenue)",
            format_amount(saving),
            config.cogs_saving_estimate_pct,
        ),
    })
}

/// Rule 2: the top menus by revenue hold too large a share of the total.
fn concentration_rule(stats: &[MenuStat], config: &RecommendConfig) -> Option<Recommendation> {
    // Concentration is trivially 100% when every menu is in the top set.
    if stats.len() <= config.concentration_top_n {
        return None;
    }
    let total_revenue: f64 = stats.iter().map(|s| s.total_revenue).sum();
    if total_revenue <= 0.0 {
        return None;
    }

    let mut ranked: Vec<&MenuStat> = stats.iter().collect();
    ranked.sort_by(|a, b| {
        by_menu_name(
            b.total_revenue
                .partial_cmp(&a.total_revenue)
                .unwrap_or(Ordering::Equal),
            a,
            b,
        )
    });
    ranked.truncate(config.concentration_top_n);

    let top_revenue: f64 = ranked.iter().map(|s| s.total_revenue).sum();
    let share = top_revenue / total_revenue * 100.0;
    if share <= config.concentration_threshold_pct {
        return None;
    }

    Some(Recommendation {
        title: "Diversify the menu portfolio".to_string(),
        description: format!(
            "The top {} menus generate {:.1}% of revenue ({}). \
             Promote a broader mix to reduce dependency on a few items.",
            ranked.len(),
            share,
            join_names(&ranked),
        ),
        potential_saving: "Qualitative: lower revenue concentration risk".to_string(),
    })
}

/// Rule 3: the bottom quantile of menus by units sold underperforms.
fn underperformer_rule(stats: &[MenuStat], config: &RecommendConfig) -> Option<Recommendation> {
    if stats.len() < config.underperformer_min_menus {
        return None;
    }

    let mut quantities: Vec<u64> = stats.iter().map(|s| s.total_qty).collect();
    quantities.sort_unstable();
    let cutoff = quantities[percentile_index(quantities.len(), config.underperformer_quantile)];

    let laggards: Vec<&MenuStat> = stats.iter().filter(|s| s.total_qty <= cutoff).collect();
    if laggards.is_empty() || laggards.len() == stats.len() {
        return None;
    }

    Some(Recommendation {
        title: "Optimize or discontinue slow movers".to_string(),
        description: format!(
            "{} menu(s) sit in the bottom {:.0}% by units sold: {}. \
             Consider recipe rework, bundling, or removal.",
            laggards.len(),
            config.underperformer_quantile * 100.0,
            join_names(&laggards),
        ),
        potential_saving: format!(
            "Reduced waste and prep cost across {} menu(s)",
            laggards.len()
        ),
    })
}

/// Rule 4: high-margin menus selling below the median volume deserve
/// promotion.
fn hidden_gem_rule(stats: &[MenuStat], config: &RecommendConfig) -> Option<Recommendation> {
    if stats.len() < config.underperformer_min_menus {
        return None;
    }

    let mut margins: Vec<f64> = stats.iter().map(|s| s.margin_percentage).collect();
    margins.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let margin_cutoff = margins[percentile_index(margins.len(), config.promo_margin_percentile)];

    let mut quantities: Vec<u64> = stats.iter().map(|s| s.total_qty).collect();
    quantities.sort_unstable();
    let median_qty = quantities[quantities.len() / 2];

    let gems: Vec<&MenuStat> = stats
        .iter()
        .filter(|s| s.margin_percentage > margin_cutoff && s.total_qty < median_qty)
        .collect();
    if gems.is_empty() {
        return None;
    }

    let combined_margin: f64 = gems.iter().map(|s| s.total_margin).sum();
    let uplift = combined_margin * config.promo_uplift_factor;

    Some(Recommendation {
        title: "Promote high-margin, low-volume menus".to_string(),
        description: format!(
            "{} menu(s) beat the {:.0}th margin percentile but sell below \
             the median volume: {}. Feature them in promotions.",
            gems.len(),
            config.promo_margin_percentile * 100.0,
            join_names(&gems),
        ),
        potential_saving: format!(
            "~{} additional margin at {:.0}% volume uplift",
            format_amount(uplift),
            config.promo_uplift_factor * 100.0,
        ),
    })
}
