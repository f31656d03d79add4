//! Bounded data digest for the external AI analyst.
//!
//! The chat layer forwards this block verbatim as model context, so the
//! digest must carry everything a language model needs to answer typical
//! business questions without re-deriving statistics, while staying a
//! fixed size regardless of how large the dataset is. All list lengths are
//! capped by the constants below.

use std::fmt::Write;

use crate::aggregate::{
    category_breakdown, cogs_efficiency, most_profitable, overview_totals, top_performing,
};
use crate::dataset::Dataset;
use crate::util::format_amount;

/// Menus listed per ranking section.
pub const SUMMARY_TOP_MENUS: usize = 5;

/// Categories listed before the digest truncates with a count.
pub const SUMMARY_MAX_CATEGORIES: usize = 8;

/// Build the bounded statistical digest of the filtered dataset.
pub fn data_context(dataset: &Dataset) -> String {
    if dataset.is_empty() {
        return "No sales records match the current filters.".to_string();
    }

    let totals = overview_totals(dataset);
    let mut out = String::new();

    // Writes into a String cannot fail.
    let _ = writeln!(out, "SALES DATA SUMMARY");
    if let Some((start, end)) = dataset.date_range() {
        let _ = writeln!(
            out,
            "Period: {} to {} ({} transactions)",
            start, end, totals.records
        );
    }
    let _ = writeln!(out, "Total revenue: {}", format_amount(totals.total_revenue));
    let _ = writeln!(out, "Total COGS: {}", format_amount(totals.total_cogs));
    let _ = writeln!(
        out,
        "Total margin: {} ({:.1}% of revenue)",
        format_amount(totals.total_margin),
        totals.margin_pct
    );
    let _ = writeln!(
        out,
        "Average COGS: {:.1}% | COGS efficiency score: {:.1}/100",
        totals.avg_cogs_pct,
        cogs_efficiency(dataset)
    );

    let _ = writeln!(out, "\nTop sellers (by units):");
    for s in top_performing(dataset, SUMMARY_TOP_MENUS) {
        let _ = writeln!(
            out,
            "  - {}: {} units, revenue {}",
            s.menu,
            s.total_qty,
            format_amount(s.total_revenue)
        );
    }

    let _ = writeln!(out, "\nMost profitable (by margin per unit):");
    for s in most_profitable(dataset, SUMMARY_TOP_MENUS) {
        let _ = writeln!(
            out,
            "  - {}: {:.2} margin/unit, {:.1}% margin",
            s.menu, s.avg_margin, s.margin_percentage
        );
    }

    let categories = category_breakdown(dataset);
    let _ = writeln!(out, "\nCategories:");
    for c in categories.iter().take(SUMMARY_MAX_CATEGORIES) {
        let _ = writeln!(
            out,
            "  - {}: revenue {}, margin {:.1}%, avg COGS {:.1}%",
            c.category,
            format_amount(c.total_revenue),
            c.margin_percentage,
            c.avg_cogs_pct
        );
    }
    if categories.len() > SUMMARY_MAX_CATEGORIES {
        let _ = writeln!(
            out,
            "  (+{} more categories)",
            categories.len() - SUMMARY_MAX_CATEGORIES
        );
    }

    out
}
