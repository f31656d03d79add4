//! Default tuning constants for the COGS optimization heuristics.
//!
//! These defaults carry over from the original dashboard's fixed values and
//! are not derived business truth. `RecommendConfig` exposes each one as a
//! named field so callers can tune a rule without touching its logic.

/// Mean COGS percentage across the worst offenders above which the
/// reduce-COGS rule fires.
pub const HIGH_COGS_THRESHOLD_PCT: f64 = 30.0;

/// Estimated achievable saving, as a percentage of the offenders' combined
/// revenue.
pub const COGS_SAVING_ESTIMATE_PCT: f64 = 5.0;

/// How many of the highest-COGS menus the reduce-COGS rule inspects.
pub const WORST_OFFENDER_COUNT: usize = 5;

/// How many top-revenue menus the concentration rule inspects.
pub const CONCENTRATION_TOP_N: usize = 5;

/// Revenue share (percent) above which the portfolio is considered too
/// concentrated.
pub const CONCENTRATION_THRESHOLD_PCT: f64 = 60.0;

/// Quantile of units sold below which a menu counts as an underperformer.
pub const UNDERPERFORMER_QUANTILE: f64 = 0.20;

/// Minimum distinct menus before quantile/percentile rules are meaningful.
pub const UNDERPERFORMER_MIN_MENUS: usize = 5;

/// Margin-percentage percentile a menu must exceed to qualify as a hidden
/// gem.
pub const PROMO_MARGIN_PERCENTILE: f64 = 0.80;

/// Assumed volume uplift from promoting hidden gems, as a multiple of
/// their current combined margin.
pub const PROMO_UPLIFT_FACTOR: f64 = 0.5;
