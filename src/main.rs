use analytics::{AggregationCache, AggregationEngine, AggregationKey, MetricSet};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets, CellAlignment, Table};
use configuration::Config;
use core_types::{DataScope, Dimension};
use dataset::DatasetSlice;
use indicatif::{ProgressBar, ProgressStyle};
use report::format::{format_currency, format_currency_compact, format_compact, format_count, format_opt_price, format_pct, format_qty};
use report::{
    render_document, top_share_broker, CancelFlag, ComposeRequest, DocumentComposer, TextRenderer,
};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

mod loader;

/// The main entry point for the Teadesk auction intelligence application.
fn main() {
    // Initialize structured logging; RUST_LOG controls verbosity.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Overview(args) => handle_overview(&cli.config, args),
        Commands::Report(args) => handle_report(&cli.config, args),
    };
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Tea auction intelligence: on-screen aggregates and printable reports.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print headline metrics and an aggregate table for one dimension.
    Overview(OverviewArgs),
    /// Compose and render the selected report sections to a paginated file.
    Report(ReportArgs),
}

#[derive(Parser)]
struct OverviewArgs {
    /// Dimension to slice the aggregates by.
    #[arg(long, value_enum, default_value_t = DimensionArg::Broker)]
    by: DimensionArg,

    /// Emit the aggregates as JSON instead of a table.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    scope: ScopeArgs,
}

#[derive(Parser)]
struct ReportArgs {
    /// Output file for the rendered report.
    #[arg(long, default_value = "report.txt")]
    out: PathBuf,

    /// Restrict the report to a single broker's catalogue.
    #[arg(long)]
    broker: Option<String>,

    #[command(flatten)]
    scope: ScopeArgs,
}

/// Overrides for the configured data scope.
#[derive(Parser)]
struct ScopeArgs {
    /// Run over every loaded sale.
    #[arg(long, conflicts_with = "last")]
    all: bool,

    /// Run over the most recent N sales.
    #[arg(long, value_name = "N")]
    last: Option<u32>,
}

impl ScopeArgs {
    fn resolve(&self, configured: DataScope) -> DataScope {
        if self.all {
            DataScope::AllSales
        } else if let Some(n) = self.last {
            DataScope::LastNSales(n)
        } else {
            configured
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DimensionArg {
    Broker,
    Buyer,
    Grade,
    SubElevation,
    Category,
    SellingMark,
    SaleNo,
}

impl DimensionArg {
    fn dimension(self) -> Dimension {
        match self {
            DimensionArg::Broker => Dimension::Broker,
            DimensionArg::Buyer => Dimension::Buyer,
            DimensionArg::Grade => Dimension::Grade,
            DimensionArg::SubElevation => Dimension::SubElevation,
            DimensionArg::Category => Dimension::Category,
            DimensionArg::SellingMark => Dimension::SellingMark,
            DimensionArg::SaleNo => Dimension::SaleNo,
        }
    }
}

// ==============================================================================
// Overview Command Logic
// ==============================================================================

/// Prints the headline metrics and one aggregate table for the chosen
/// dimension.
fn handle_overview(config_path: &str, args: OverviewArgs) -> anyhow::Result<()> {
    let config = configuration::load_config_from(config_path)?;
    let data = loader::load_sales_folder(&config.data.folder)?;
    if data.is_empty() {
        anyhow::bail!(
            "No sale files found in '{}'. Add files like Sale_42.csv and retry.",
            config.data.folder
        );
    }

    let scope = args.scope.resolve(config.data.scope);
    let slice = data.slice(scope);
    let engine = AggregationEngine::new();
    let cache = AggregationCache::new();

    let dimension = args.by.dimension();
    let buckets = cache.get_or_compute(&engine, &slice, &[dimension])?;

    if args.json {
        let rows: Vec<serde_json::Value> = buckets
            .iter()
            .map(|(key, metrics)| {
                serde_json::json!({ "key": key.to_string(), "metrics": metrics })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let overall = engine.summarize(&slice);
    print_headline(&slice, &overall);

    if let Some(brief) = market_brief(&config, &engine, &cache, &slice, &overall)? {
        println!("{brief}");
        println!();
    }

    println!("Aggregates by {}:", dimension.column().header());
    println!("{}", aggregate_table(dimension, &buckets));
    Ok(())
}

fn print_headline(slice: &DatasetSlice<'_>, overall: &MetricSet) {
    if let Some((first, last)) = slice.sale_range() {
        if first == last {
            println!("Sale {last} - Market Overview");
        } else {
            println!("Sales {first}-{last} - Market Overview");
        }
    }
    println!("  Total Market Value: {}", format_currency_compact(overall.total_value));
    println!("  Average Price/kg:   {}", match overall.avg_price {
        Some(price) => format_currency(price),
        None => "N/A".to_string(),
    });
    println!("  Total Weight:       {} kg", format_compact(overall.catalogued_kg));
    println!("  Sold %:             {}", format_pct(overall.sold_pct));
    println!("  Total Lots:         {}", format_count(overall.lot_count));
    println!();
}

/// One-line market brief for the highlight broker: value share and average
/// price versus the market average.
fn market_brief(
    config: &Config,
    engine: &AggregationEngine,
    cache: &AggregationCache,
    slice: &DatasetSlice<'_>,
    overall: &MetricSet,
) -> anyhow::Result<Option<String>> {
    let broker = match &config.report.highlight_broker {
        Some(broker) => Some(broker.clone()),
        None => top_share_broker(engine, cache, slice)?,
    };
    let Some(broker) = broker else {
        return Ok(None);
    };

    let by_broker = cache.get_or_compute(engine, slice, &[Dimension::Broker])?;
    let Some(metrics) = by_broker.get(&AggregationKey::new(vec![broker.clone()])) else {
        return Ok(None);
    };

    let share = if overall.total_value > Decimal::ZERO {
        metrics.total_value / overall.total_value * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    };
    let price_clause = match (metrics.avg_price, overall.avg_price) {
        (Some(broker_avg), Some(market_avg)) => {
            let diff = broker_avg - market_avg;
            let direction = if diff >= Decimal::ZERO { "above" } else { "below" };
            format!(
                " with an average price of {}/kg, {} {} the market average",
                format_currency(broker_avg),
                format_currency(diff.abs()),
                direction
            )
        }
        (Some(broker_avg), None) => {
            format!(" with an average price of {}/kg", format_currency(broker_avg))
        }
        _ => String::new(),
    };
    Ok(Some(format!(
        "{broker} holds a market share of {}{price_clause}. Total value: {}.",
        format_pct(share),
        format_currency_compact(metrics.total_value)
    )))
}

fn aggregate_table(
    dimension: Dimension,
    buckets: &std::collections::BTreeMap<AggregationKey, MetricSet>,
) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_header(vec![
        dimension.column().header(),
        "Catalogued (kg)",
        "Sold (kg)",
        "Unsold (kg)",
        "Outsold (kg)",
        "Sold %",
        "Avg Price (LKR)",
        "Total Value (LKR)",
        "Lots",
    ]);
    for (key, metrics) in buckets {
        table.add_row(vec![
            key.to_string(),
            format_qty(metrics.catalogued_kg),
            format_qty(metrics.sold_kg),
            format_qty(metrics.unsold_kg),
            format_qty(metrics.outsold_kg),
            format_pct(metrics.sold_pct),
            format_opt_price(metrics.avg_price),
            format_qty(metrics.total_value),
            format_count(metrics.lot_count),
        ]);
    }
    for (index, column) in table.column_iter_mut().enumerate() {
        if index > 0 {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

// ==============================================================================
// Report Command Logic
// ==============================================================================

/// Handles the orchestration of report generation: compose the selected
/// sections, render with page-numbered footers, write the artifact.
fn handle_report(config_path: &str, args: ReportArgs) -> anyhow::Result<()> {
    let config = configuration::load_config_from(config_path)?;
    let data = loader::load_sales_folder(&config.data.folder)?;
    if data.is_empty() {
        anyhow::bail!(
            "No sale files found in '{}'. Add files like Sale_42.csv and retry.",
            config.data.folder
        );
    }

    let scope = args.scope.resolve(config.data.scope);
    let full_slice = data.slice(scope);
    let slice = match &args.broker {
        Some(broker) => full_slice.filter_broker(broker),
        None => full_slice.clone(),
    };
    if slice.is_empty() {
        anyhow::bail!("No lots in scope for this report (check --broker and the data scope).");
    }

    let engine = AggregationEngine::new();
    let cache = AggregationCache::new();
    let composer = DocumentComposer::new(
        config.company.name.clone(),
        config.company.footer_label.clone(),
        config.report.thresholds,
    );
    let request = ComposeRequest {
        slice: &slice,
        period: data.sale_range(),
        selection: config.report.sections,
        highlight_broker: config.report.highlight_broker.clone(),
        generated_at: Utc::now(),
    };

    // Set up the progress spinner for the composition run
    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    progress.enable_steady_tick(Duration::from_millis(120));
    progress.set_message(format!(
        "Composing {} report section(s)...",
        request.selection.count()
    ));

    let document = composer.compose(&engine, &cache, &request, &CancelFlag::new())?;
    progress.set_message("Rendering pages...");

    let mut renderer = TextRenderer::new();
    let artifact = render_document(&mut renderer, &document)?;
    let page_count = artifact.split('\u{0c}').count();

    std::fs::write(&args.out, &artifact)?;
    progress.finish_with_message(format!(
        "Report written to {} ({page_count} pages)",
        args.out.display()
    ));
    Ok(())
}
