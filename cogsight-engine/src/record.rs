//! Canonical sale records and their derivation from raw export rows.
//!
//! A `RawSaleRow` is one line of the point-of-sale export, with every field
//! optional so header validation and row validation stay separate concerns.
//! `SaleRecord` is the canonical, immutable form: derived columns
//! (`total_revenue`, `cogs_pct`, `margin`) are computed here once, at load
//! time, never lazily downstream.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Branch value assigned when the export carries no `Branch` column.
pub const DEFAULT_BRANCH: &str = "main";

/// Tolerance when comparing a supplied `Total` against `Qty × Price`.
/// Larger gaps are flagged with a warning; the supplied value wins.
pub const REVENUE_MISMATCH_TOLERANCE: f64 = 0.01;

/// Timestamp formats seen across POS export variants, tried in order.
const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// One raw row of the sales export.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSaleRow {
    #[serde(rename = "Sales Date")]
    pub sales_date: Option<String>,
    #[serde(rename = "Menu")]
    pub menu: Option<String>,
    #[serde(rename = "Menu Category")]
    pub menu_category: Option<String>,
    #[serde(rename = "Branch")]
    pub branch: Option<String>,
    #[serde(rename = "Qty")]
    pub qty: Option<u64>,
    #[serde(rename = "Price")]
    pub price: Option<f64>,
    #[serde(rename = "Total")]
    pub total: Option<f64>,
    #[serde(rename = "COGS Total")]
    pub cogs_total: Option<f64>,
}

/// One canonical transaction record. Immutable once loaded.
#[derive(Debug, Clone, Serialize)]
pub struct SaleRecord {
    pub sale_timestamp: NaiveDateTime,
    pub menu_name: String,
    pub menu_category: String,
    pub branch: String,
    pub quantity: u64,
    pub unit_price: f64,
    pub total_revenue: f64,
    pub cogs_total: f64,
    /// `cogs_total / total_revenue × 100`; 0 when revenue is 0.
    pub cogs_pct: f64,
    /// `total_revenue − cogs_total`. Negative when COGS exceeds revenue.
    pub margin: f64,
}

impl SaleRecord {
    /// Calendar date of the sale. Range filters compare on this, ignoring
    /// the time-of-day component.
    pub fn sale_date(&self) -> NaiveDate {
        self.sale_timestamp.date()
    }
}

/// Parse a POS timestamp, accepting the known export formats and a bare
/// date (interpreted as midnight).
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

impl RawSaleRow {
    /// Validate and convert into a canonical record, computing the derived
    /// columns. Returns the rejection reason for rows that cannot be used;
    /// the loader skips those rather than failing the whole load.
    pub fn into_record(self) -> Result<SaleRecord, String> {
        let raw_ts = self.sales_date.ok_or("missing sales date")?;
        let sale_timestamp = parse_timestamp(&raw_ts)
            .ok_or_else(|| format!("unparseable sales date '{raw_ts}'"))?;

        let menu_name = self.menu.unwrap_or_default();
        if menu_name.trim().is_empty() {
            return Err("empty menu name".into());
        }
        let menu_category = self.menu_category.ok_or("missing menu category")?;

        let quantity = self.qty.ok_or("missing qty")?;

        let (unit_price, total_revenue) = match (self.price, self.total) {
            (Some(price), Some(total)) => {
                let derived = quantity as f64 * price;
                if (derived - total).abs() > REVENUE_MISMATCH_TOLERANCE {
                    // Anomaly, not a rejection: the supplied total wins.
                    log::warn!(
                        "'{menu_name}': supplied total {total:.2} differs from qty × price {derived:.2}"
                    );
                }
                (price, total)
            }
            (Some(price), None) => (price, quantity as f64 * price),
            (None, Some(total)) => {
                let price = if quantity > 0 { total / quantity as f64 } else { 0.0 };
                (price, total)
            }
            (None, None) => return Err("missing both price and total".into()),
        };
        if unit_price < 0.0 {
            return Err(format!("negative unit price {unit_price}"));
        }

        let cogs_total = self.cogs_total.ok_or("missing COGS total")?;
        if cogs_total < 0.0 {
            return Err(format!("negative COGS total {cogs_total}"));
        }
        if cogs_total > total_revenue {
            // Flagged, not rejected: the negative margin flows through
            // aggregates faithfully.
            log::warn!(
                "'{menu_name}': COGS {cogs_total:.2} exceeds revenue {total_revenue:.2}"
            );
        }

        let margin = total_revenue - cogs_total;
        let cogs_pct = if total_revenue > 0.0 {
            cogs_total / total_revenue * 100.0
        } else {
            0.0
        };

        let branch = self
            .branch
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        Ok(SaleRecord {
            sale_timestamp,
            menu_name,
            menu_category,
            branch,
            quantity,
            unit_price,
            total_revenue,
            cogs_total,
            cogs_pct,
            margin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(menu: &str, qty: u64, price: f64, cogs: f64) -> RawSaleRow {
        RawSaleRow {
            sales_date: Some("2024-01-01 12:30:00".into()),
            menu: Some(menu.into()),
            menu_category: Some("Mains".into()),
            branch: None,
            qty: Some(qty),
            price: Some(price),
            total: None,
            cogs_total: Some(cogs),
        }
    }

    #[test]
    fn timestamp_formats_are_accepted() {
        assert!(parse_timestamp("2024-01-01 09:30:00").is_some());
        assert!(parse_timestamp("2024-01-01T09:30:00").is_some());
        assert!(parse_timestamp("01/02/2024 09:30").is_some());
        assert!(parse_timestamp("2024-01-01").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn bare_date_means_midnight() {
        let ts = parse_timestamp("2024-03-05").unwrap();
        assert_eq!(ts.time(), NaiveTime::MIN);
    }

    #[test]
    fn derived_columns_are_computed() {
        let rec = raw("Burger", 3, 20.0, 30.0).into_record().unwrap();
        assert!((rec.total_revenue - 60.0).abs() < 1e-9);
        assert!((rec.margin - 30.0).abs() < 1e-9);
        assert!((rec.cogs_pct - 50.0).abs() < 1e-9);
        assert_eq!(rec.branch, DEFAULT_BRANCH);
    }

    #[test]
    fn supplied_total_wins_over_derived() {
        let mut row = raw("Burger", 3, 20.0, 30.0);
        row.total = Some(66.0);
        let rec = row.into_record().unwrap();
        assert!((rec.total_revenue - 66.0).abs() < 1e-9);
    }

    #[test]
    fn total_without_price_derives_unit_price() {
        let mut row = raw("Burger", 4, 0.0, 10.0);
        row.price = None;
        row.total = Some(100.0);
        let rec = row.into_record().unwrap();
        assert!((rec.unit_price - 25.0).abs() < 1e-9);
    }

    #[test]
    fn missing_price_and_total_is_rejected() {
        let mut row = raw("Burger", 1, 0.0, 0.0);
        row.price = None;
        row.total = None;
        assert!(row.into_record().is_err());
    }

    #[test]
    fn empty_menu_name_is_rejected() {
        let row = raw("  ", 1, 5.0, 1.0);
        assert!(row.into_record().is_err());
    }

    #[test]
    fn negative_cogs_is_rejected() {
        let row = raw("Burger", 1, 5.0, -1.0);
        assert!(row.into_record().is_err());
    }

    #[test]
    fn cogs_above_revenue_yields_negative_margin_but_is_kept() {
        let rec = raw("Loss Leader", 1, 5.0, 8.0).into_record().unwrap();
        assert!((rec.margin - (-3.0)).abs() < 1e-9);
        assert!(rec.cogs_pct > 100.0);
    }

    #[test]
    fn zero_revenue_guards_cogs_pct() {
        let mut row = raw("Comp Meal", 2, 0.0, 4.0);
        row.total = Some(0.0);
        let rec = row.into_record().unwrap();
        assert_eq!(rec.cogs_pct, 0.0);
        assert!((rec.margin - (-4.0)).abs() < 1e-9);
    }
}
