use std::collections::BTreeSet;
use std::env;
use std::process;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use cogsight_engine::aggregate::{
    category_breakdown, cogs_efficiency, cogs_trend, daily_sales_trend, high_cogs_menus,
    low_cogs_menus, most_profitable, overview_totals, top_performing, weekly_trend, CategoryStat,
    DailyCogs, DailyRevenue, MenuStat, OverviewTotals, WeeklyRevenue,
};
use cogsight_engine::filter::{apply, BranchFilter, FilterSpec};
use cogsight_engine::loader::load_file;
use cogsight_engine::recommend::{cogs_optimization_recommendations, RecommendConfig};
use cogsight_engine::summary::data_context;
use cogsight_engine::util::format_amount;
use cogsight_engine::{Dataset, Recommendation};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DigestJson {
    generated_at: String,
    period: PeriodJson,
    branch_filter: String,
    overview: OverviewTotals,
    cogs_efficiency: f64,
    top_performing: Vec<MenuStat>,
    most_profitable: Vec<MenuStat>,
    high_cogs: Vec<MenuStat>,
    low_cogs: Vec<MenuStat>,
    categories: Vec<CategoryStat>,
    daily_trend: Vec<DailyRevenue>,
    weekly_trend: Vec<WeeklyRevenue>,
    cogs_trend: Vec<DailyCogs>,
    recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
struct PeriodJson {
    start: String,
    end: String,
}

fn build_json(filtered: &Dataset, spec: &FilterSpec, top_n: usize) -> DigestJson {
    let branch_filter = match &spec.branch {
        BranchFilter::All => "all".to_string(),
        BranchFilter::Only(branch) => branch.clone(),
    };

    DigestJson {
        generated_at: Utc::now().to_rfc3339(),
        period: PeriodJson {
            start: spec.start.to_string(),
            end: spec.end.to_string(),
        },
        branch_filter,
        overview: overview_totals(filtered),
        cogs_efficiency: cogs_efficiency(filtered),
        top_performing: top_performing(filtered, top_n),
        most_profitable: most_profitable(filtered, top_n),
        high_cogs: high_cogs_menus(filtered, top_n),
        low_cogs: low_cogs_menus(filtered, top_n),
        categories: category_breakdown(filtered),
        daily_trend: daily_sales_trend(filtered),
        weekly_trend: weekly_trend(filtered),
        cogs_trend: cogs_trend(filtered),
        recommendations: cogs_optimization_recommendations(filtered, &RecommendConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Human-readable output
// ---------------------------------------------------------------------------

fn print_human(filtered: &Dataset, top_n: usize, load_ms: u128, analyze_ms: u128) {
    println!();
    println!("  ╔══════════════════════════════════════════════════════════════╗");
    println!("  ║           COGSIGHT — Sales & COGS Analytics Digest           ║");
    println!("  ╚══════════════════════════════════════════════════════════════╝");
    println!();

    if filtered.is_empty() {
        println!("  No sales records match the current filters.");
        println!();
        return;
    }

    let totals = overview_totals(filtered);
    if let Some((start, end)) = filtered.date_range() {
        println!(
            "  {} transactions  ·  {} to {}  ·  {} branch(es)",
            totals.records,
            start,
            end,
            filtered.branches().len()
        );
    }
    println!(
        "  Revenue {}  ·  COGS {}  ·  Margin {} ({:.1}%)",
        format_amount(totals.total_revenue),
        format_amount(totals.total_cogs),
        format_amount(totals.total_margin),
        totals.margin_pct
    );
    println!(
        "  Avg COGS {:.1}%  ·  COGS efficiency {:.1}/100",
        totals.avg_cogs_pct,
        cogs_efficiency(filtered)
    );
    println!();

    println!("  {:─<64}", "");
    println!("  Top sellers");
    for (i, s) in top_performing(filtered, top_n).iter().enumerate() {
        println!(
            "  {}. {:24} {:>6} units  {:>12} revenue",
            i + 1,
            s.menu,
            s.total_qty,
            format_amount(s.total_revenue)
        );
    }
    println!();

    println!("  Most profitable (margin per unit)");
    for (i, s) in most_profitable(filtered, top_n).iter().enumerate() {
        println!(
            "  {}. {:24} {:>10.2}/unit  {:>6.1}% margin",
            i + 1,
            s.menu,
            s.avg_margin,
            s.margin_percentage
        );
    }
    println!();

    println!("  Highest COGS");
    for (i, s) in high_cogs_menus(filtered, top_n).iter().enumerate() {
        println!(
            "  {}. {:24} {:>6.1}% COGS  {:>12} revenue",
            i + 1,
            s.menu,
            s.avg_cogs_pct,
            format_amount(s.total_revenue)
        );
    }
    println!("  {:─<64}", "");
    println!();

    let recommendations =
        cogs_optimization_recommendations(filtered, &RecommendConfig::default());
    if recommendations.is_empty() {
        println!("  No optimization recommendations. COGS looks under control.");
    } else {
        println!("  Recommendations");
        for (i, rec) in recommendations.iter().enumerate() {
            println!("  {}. {}", i + 1, rec.title);
            println!("     {}", rec.description);
            println!("     Potential saving: {}", rec.potential_saving);
            println!();
        }
    }

    println!(
        "  ⏱  CSV loaded in {}ms · Analysis ran in {}ms · Total {}ms",
        load_ms,
        analyze_ms,
        load_ms + analyze_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn usage() -> ! {
    eprintln!("Usage: cogsight-server <sales.csv> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --from DATE        Start of the date range (YYYY-MM-DD, inclusive)");
    eprintln!("  --to DATE          End of the date range (YYYY-MM-DD, inclusive)");
    eprintln!("  --categories a,b   Comma-separated menu categories to keep");
    eprintln!("  --branch NAME      Analyze a single branch");
    eprintln!("  --top N            Rows per ranking (default: 5)");
    eprintln!("  --json             Output as JSON instead of formatted text");
    eprintln!("  --context          Print the AI data-context digest and exit");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  cogsight-server fixtures/sample_sales.csv");
    eprintln!("  cogsight-server fixtures/sample_sales.csv --from 2024-01-01 --to 2024-01-31 --json");
    process::exit(1);
}

fn parse_date(raw: &str, flag: &str) -> NaiveDate {
    raw.parse().unwrap_or_else(|_| {
        eprintln!("Error: {flag} expects a YYYY-MM-DD date, got '{raw}'");
        process::exit(1);
    })
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }
    let csv_path = &args[1];

    let mut from: Option<NaiveDate> = None;
    let mut to: Option<NaiveDate> = None;
    let mut categories: Option<BTreeSet<String>> = None;
    let mut branch: Option<String> = None;
    let mut top_n: usize = 5;
    let mut json_output = false;
    let mut context_output = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--from" | "--to" | "--categories" | "--branch" | "--top" if i + 1 >= args.len() => {
                eprintln!("Error: {} requires a value", args[i]);
                process::exit(1);
            }
            "--from" => {
                from = Some(parse_date(&args[i + 1], "--from"));
                i += 2;
            }
            "--to" => {
                to = Some(parse_date(&args[i + 1], "--to"));
                i += 2;
            }
            "--categories" => {
                categories = Some(
                    args[i + 1]
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                );
                i += 2;
            }
            "--branch" => {
                branch = Some(args[i + 1].trim().to_string());
                i += 2;
            }
            "--top" => {
                top_n = args[i + 1].parse().unwrap_or_else(|_| {
                    eprintln!("Error: --top requires a positive integer");
                    process::exit(1);
                });
                i += 2;
            }
            "--json" => {
                json_output = true;
                i += 1;
            }
            "--context" => {
                context_output = true;
                i += 1;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                usage();
            }
        }
    }

    let load_start = Instant::now();
    let dataset = match load_file(csv_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error loading CSV: {}", e);
            process::exit(1);
        }
    };
    let load_ms = load_start.elapsed().as_millis();
    log::info!(
        "loaded {} records across {} branch(es)",
        dataset.record_count(),
        dataset.branches().len()
    );

    let mut spec = FilterSpec::unrestricted(&dataset);
    if let Some(from) = from {
        spec.start = from;
    }
    if let Some(to) = to {
        spec.end = to;
    }
    if let Some(categories) = categories {
        spec.categories = categories;
    }
    if let Some(branch) = branch {
        spec.branch = BranchFilter::Only(branch);
    }

    let analyze_start = Instant::now();
    let filtered = match apply(&dataset, &spec) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error applying filters: {}", e);
            process::exit(1);
        }
    };

    if context_output {
        println!("{}", data_context(&filtered));
        return;
    }

    if json_output {
        let digest = build_json(&filtered, &spec, top_n);
        match serde_json::to_string_pretty(&digest) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing digest: {}", e);
                process::exit(1);
            }
        }
    } else {
        let analyze_ms = analyze_start.elapsed().as_millis();
        print_human(&filtered, top_n, load_ms, analyze_ms);
    }
}
