use std::collections::BTreeSet;

use cogsight_engine::aggregate::*;
use cogsight_engine::filter::{apply, BranchFilter, FilterSpec};
use cogsight_engine::loader::load;
use cogsight_engine::recommend::{cogs_optimization_recommendations, RecommendConfig};
use cogsight_engine::summary::data_context;
use cogsight_engine::{Dataset, EngineError};

// ---------------------------------------------------------------------------
// Test data fixtures
// ---------------------------------------------------------------------------

/// A realistic week of sales across two branches and three categories.
/// 2024-01-01 is a Monday.
const SAMPLE_CSV: &str = "\
Sales Date,Menu,Menu Category,Branch,Qty,Price,Total,COGS Total
2024-01-01 09:00:00,Espresso,Drinks,Central,5,10.00,50.00,15.00
2024-01-01 12:00:00,Burger,Mains,Central,3,20.00,60.00,30.00
2024-01-02 12:30:00,Burger,Mains,Central,2,20.00,40.00,20.00
2024-01-02 18:00:00,Salad,Mains,Harbor,1,15.00,15.00,5.00
2024-01-03 09:15:00,Espresso,Drinks,Harbor,4,10.00,40.00,12.00
2024-01-03 20:00:00,Cheesecake,Desserts,Central,2,12.50,25.00,20.00
";

fn sample_dataset() -> Dataset {
    load(SAMPLE_CSV.as_bytes()).unwrap()
}

fn dataset_from(csv: &str) -> Dataset {
    load(csv.as_bytes()).unwrap()
}

fn empty_view(dataset: &Dataset) -> Dataset {
    let mut spec = FilterSpec::unrestricted(dataset);
    spec.categories = BTreeSet::new();
    apply(dataset, &spec).unwrap()
}

fn total_revenue(dataset: &Dataset) -> f64 {
    dataset.records().iter().map(|r| r.total_revenue).sum()
}

// ---------------------------------------------------------------------------
// Loader contract
// ---------------------------------------------------------------------------

#[test]
fn loader_derives_columns_and_scalars_once() {
    let d = sample_dataset();
    assert_eq!(d.record_count(), 6);
    assert_eq!(d.categories(), ["Drinks", "Mains", "Desserts"]);
    assert_eq!(d.branches(), ["Central", "Harbor"]);
    assert_eq!(
        d.min_timestamp().unwrap().to_string(),
        "2024-01-01 09:00:00"
    );
    assert_eq!(
        d.max_timestamp().unwrap().to_string(),
        "2024-01-03 20:00:00"
    );
}

#[test]
fn margin_identity_holds_for_every_row() {
    for r in sample_dataset().records() {
        assert!(
            (r.margin - (r.total_revenue - r.cogs_total)).abs() < 1e-9,
            "margin identity violated for {}",
            r.menu_name
        );
    }
}

#[test]
fn schema_error_names_missing_columns() {
    let result = load("Menu,Price\nBurger,5.00\n".as_bytes());
    match result {
        Err(EngineError::MissingColumns(missing)) => {
            assert!(missing.contains(&"Sales Date".to_string()));
            assert!(missing.contains(&"COGS Total".to_string()));
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Filter laws
// ---------------------------------------------------------------------------

#[test]
fn filtering_is_idempotent() {
    let d = sample_dataset();
    let mut spec = FilterSpec::unrestricted(&d);
    spec.categories = ["Mains".to_string()].into_iter().collect();
    spec.branch = BranchFilter::Only("Central".into());

    let once = apply(&d, &spec).unwrap();
    // The once-filtered view is single-branch, so the second pass exercises
    // the branch short-circuit as well.
    let twice = apply(&once, &spec).unwrap();
    assert_eq!(once.record_count(), twice.record_count());
    let a: Vec<_> = once.records().iter().map(|r| &r.menu_name).collect();
    let b: Vec<_> = twice.records().iter().map(|r| &r.menu_name).collect();
    assert_eq!(a, b);
}

#[test]
fn filtered_rows_are_a_subset_satisfying_the_spec() {
    let d = sample_dataset();
    let mut spec = FilterSpec::unrestricted(&d);
    spec.start = "2024-01-02".parse().unwrap();
    spec.categories = ["Mains".to_string(), "Drinks".to_string()]
        .into_iter()
        .collect();

    let filtered = apply(&d, &spec).unwrap();
    assert!(filtered.record_count() <= d.record_count());
    for r in filtered.records() {
        assert!(r.sale_date() >= spec.start && r.sale_date() <= spec.end);
        assert!(spec.categories.contains(&r.menu_category));
    }
}

#[test]
fn revenue_is_conserved_across_the_filter_partition() {
    let d = sample_dataset();
    let mut spec = FilterSpec::unrestricted(&d);
    spec.categories = ["Drinks".to_string()].into_iter().collect();

    let kept = apply(&d, &spec).unwrap();
    let excluded: f64 = d
        .records()
        .iter()
        .filter(|r| r.menu_category != "Drinks")
        .map(|r| r.total_revenue)
        .sum();
    assert!((total_revenue(&kept) + excluded - total_revenue(&d)).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// Ranking determinism
// ---------------------------------------------------------------------------

#[test]
fn rankings_are_deterministic_across_calls() {
    let d = sample_dataset();
    for _ in 0..3 {
        let top = top_performing(&d, 4);
        let menus: Vec<_> = top.iter().map(|s| s.menu.as_str()).collect();
        assert_eq!(menus, ["Espresso", "Burger", "Cheesecake", "Salad"]);
    }
}

#[test]
fn quantity_ties_resolve_by_menu_name() {
    let d = dataset_from(
        "\
Sales Date,Menu,Menu Category,Qty,Price,COGS Total
2024-01-01,Zebra Cake,Desserts,4,10.00,3.00
2024-01-01,Apple Pie,Desserts,4,10.00,3.00
",
    );
    let top = top_performing(&d, 2);
    assert_eq!(top[0].menu, "Apple Pie");
    assert_eq!(top[1].menu, "Zebra Cake");
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[test]
fn single_menu_scenario_sums_and_scores() {
    // Three rows of menu A: quantities 2/3/5 at price 10, COGS 6/9/15.
    let d = dataset_from(
        "\
Sales Date,Menu,Menu Category,Qty,Price,COGS Total
2024-01-01 10:00:00,A,Mains,2,10.00,6.00
2024-01-01 11:00:00,A,Mains,3,10.00,9.00
2024-01-01 12:00:00,A,Mains,5,10.00,15.00
",
    );
    let top = top_performing(&d, 1);
    assert_eq!(top[0].menu, "A");
    assert_eq!(top[0].total_qty, 10);
    assert!((top[0].total_revenue - 100.0).abs() < 1e-9);
    // Every row runs 30% COGS, so efficiency = 100 − 30.
    assert!((cogs_efficiency(&d) - 70.0).abs() < 1e-9);
}

#[test]
fn daily_trend_scenario_three_points() {
    let d = dataset_from(
        "\
Sales Date,Menu,Menu Category,Qty,Price,COGS Total
2024-01-01,A,Mains,1,100.00,30.00
2024-01-02,A,Mains,1,200.00,60.00
2024-01-03,A,Mains,1,150.00,45.00
",
    );
    let trend = daily_sales_trend(&d);
    assert_eq!(trend.len(), 3);
    let sum: f64 = trend.iter().map(|p| p.revenue).sum();
    assert!((sum - 450.0).abs() < 1e-9);
    assert!(trend.windows(2).all(|w| w[0].date < w[1].date));
}

#[test]
fn volume_and_margin_rank_different_menus() {
    // X moves volume at a thin margin; Y is a slow seller with a huge one.
    let d = dataset_from(
        "\
Sales Date,Menu,Menu Category,Qty,Price,COGS Total
2024-01-01,X,Mains,100,1.00,99.00
2024-01-01,Y,Mains,1,1500.00,500.00
",
    );
    assert_eq!(most_profitable(&d, 1)[0].menu, "Y");
    assert_eq!(top_performing(&d, 1)[0].menu, "X");
    assert!((most_profitable(&d, 1)[0].avg_margin - 1000.0).abs() < 1e-9);
}

#[test]
fn cogs_above_revenue_flows_through_aggregates() {
    let d = dataset_from(
        "\
Sales Date,Menu,Menu Category,Qty,Price,COGS Total
2024-01-01,Promo Dish,Mains,1,10.00,14.00
2024-01-01,Regular,Mains,1,10.00,4.00
",
    );
    assert_eq!(d.record_count(), 2, "anomalous row must be retained");
    let totals = overview_totals(&d);
    assert!((totals.total_margin - 2.0).abs() < 1e-9); // −4 + 6
    let promo = comprehensive_menu_analysis(&d)
        .into_iter()
        .find(|s| s.menu == "Promo Dish")
        .unwrap();
    assert!(promo.total_margin < 0.0);
}

// ---------------------------------------------------------------------------
// Empty-input safety
// ---------------------------------------------------------------------------

#[test]
fn every_aggregation_handles_an_empty_view() {
    let empty = empty_view(&sample_dataset());
    assert!(empty.is_empty());

    assert!(comprehensive_menu_analysis(&empty).is_empty());
    assert!(top_performing(&empty, 5).is_empty());
    assert!(most_profitable(&empty, 5).is_empty());
    assert!(high_cogs_menus(&empty, 5).is_empty());
    assert!(low_cogs_menus(&empty, 5).is_empty());
    assert!(category_breakdown(&empty).is_empty());
    assert!(daily_sales_trend(&empty).is_empty());
    assert!(weekly_trend(&empty).is_empty());
    assert!(cogs_trend(&empty).is_empty());
    assert!(menu_detail(&empty, "Espresso").is_none());

    let hourly = hourly_sales_pattern(&empty);
    assert_eq!(hourly.len(), 24);
    assert!(hourly.iter().all(|h| h.revenue == 0.0));

    let weekday = daily_sales_pattern(&empty);
    assert_eq!(weekday.len(), 7);
    assert!(weekday.iter().all(|d| d.avg_revenue == 0.0));

    let heatmap = sales_heatmap(&empty);
    assert!(heatmap.cells.iter().flatten().all(|&c| c == 0.0));

    assert_eq!(cogs_efficiency(&empty), 0.0);

    let totals = overview_totals(&empty);
    assert_eq!(totals.records, 0);
    assert_eq!(totals.total_revenue, 0.0);
    assert_eq!(totals.margin_pct, 0.0);

    assert!(cogs_optimization_recommendations(&empty, &RecommendConfig::default()).is_empty());
}

#[test]
fn heatmap_is_complete_and_non_negative() {
    let heatmap = sales_heatmap(&sample_dataset());
    assert_eq!(heatmap.cells.len(), 7);
    for row in &heatmap.cells {
        assert_eq!(row.len(), 24);
        assert!(row.iter().all(|&c| c >= 0.0));
    }
}

// ---------------------------------------------------------------------------
// Recommendations over real data
// ---------------------------------------------------------------------------

#[test]
fn recommendations_fire_on_a_high_cogs_menu_mix() {
    let d = sample_dataset();
    let recs = cogs_optimization_recommendations(&d, &RecommendConfig::default());
    // Sample menus average well above 30% COGS.
    let titles: Vec<_> = recs.iter().map(|r| r.title.as_str()).collect();
    assert!(titles.contains(&"Reduce COGS on high-cost menus"));
    for rec in &recs {
        assert!(!rec.description.is_empty());
        assert!(!rec.potential_saving.is_empty());
    }
}

#[test]
fn recommendation_thresholds_are_configuration_not_magic() {
    let d = sample_dataset();
    let lenient = RecommendConfig {
        high_cogs_threshold_pct: 95.0,
        ..RecommendConfig::default()
    };
    let recs = cogs_optimization_recommendations(&d, &lenient);
    assert!(recs
        .iter()
        .all(|r| r.title != "Reduce COGS on high-cost menus"));
}

// ---------------------------------------------------------------------------
// AI context digest
// ---------------------------------------------------------------------------

#[test]
fn digest_summarizes_the_filtered_view() {
    let d = sample_dataset();
    let mut spec = FilterSpec::unrestricted(&d);
    spec.categories = ["Drinks".to_string()].into_iter().collect();
    let drinks = apply(&d, &spec).unwrap();

    let digest = data_context(&drinks);
    assert!(digest.contains("Espresso"));
    assert!(!digest.contains("Burger"));
    assert!(digest.contains("Total revenue: 90"));
}

#[test]
fn digest_handles_the_no_data_state() {
    let empty = empty_view(&sample_dataset());
    assert_eq!(
        data_context(&empty),
        "No sales records match the current filters."
    );
}
