use anyhow::Context;
use captable::{CapSnapshot, CapTable, SnapshotBuilder};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use waterfall::{BreakevenSolver, WaterfallAnalysis};

/// The main entry point for the cascade waterfall application.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    let result = match cli.command {
        Commands::Analyze(args) => handle_analyze(args),
        Commands::Breakeven(args) => handle_breakeven(args),
        Commands::Scenario(args) => handle_scenario(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Exit-waterfall analysis for capitalization tables.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distribute exit proceeds across the cap table at a given exit value.
    Analyze(AnalyzeArgs),
    /// Locate the exit value where common begins to out-earn preferred.
    Breakeven(BreakevenArgs),
    /// Run a named scenario from the configuration file.
    Scenario(ScenarioArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Path to the cap table JSON file.
    #[arg(long)]
    captable: PathBuf,

    /// Exit amount to distribute.
    #[arg(long)]
    exit: Decimal,

    /// Snapshot date for vesting and interest accrual (YYYY-MM-DD);
    /// defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Latest round price per share; the reference for convertible discounts.
    #[arg(long, default_value = "1.00")]
    reference_price: Decimal,

    /// Comma-separated share class IDs overriding the stacking order.
    #[arg(long)]
    order: Option<String>,

    /// Emit the full analysis as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct BreakevenArgs {
    /// Path to the cap table JSON file.
    #[arg(long)]
    captable: PathBuf,

    /// Snapshot date for vesting and interest accrual (YYYY-MM-DD);
    /// defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Latest round price per share; the reference for convertible discounts.
    #[arg(long, default_value = "1.00")]
    reference_price: Decimal,
}

#[derive(Parser)]
struct ScenarioArgs {
    /// Name of a scenario defined in the configuration file.
    name: String,

    /// Configuration file to read scenarios from.
    #[arg(long, default_value = "cascade")]
    config: String,

    /// Emit the full analysis as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn handle_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = load_snapshot(&args.captable, as_of, args.reference_price)?;
    report_exclusions(&snapshot.excluded_convertibles);

    let order = parse_order(args.order.as_deref())?;
    let analysis = waterfall::analyze(&snapshot.classes, args.exit, order.as_deref())?;

    render(&analysis, args.json)
}

fn handle_breakeven(args: BreakevenArgs) -> anyhow::Result<()> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = load_snapshot(&args.captable, as_of, args.reference_price)?;
    report_exclusions(&snapshot.excluded_convertibles);

    let ordered = waterfall::resolve_stacking_order(&snapshot.classes, None)?;
    let result = BreakevenSolver::new().solve(&ordered);

    println!("Breakeven exit value: {}", result.exit_value);
    println!("  {}", result.description);
    Ok(())
}

fn handle_scenario(args: ScenarioArgs) -> anyhow::Result<()> {
    let config = configuration::load_config(&args.config)?;
    let scenario = config
        .scenarios
        .iter()
        .find(|s| s.name == args.name)
        .with_context(|| format!("no scenario named '{}' in configuration", args.name))?;

    let snapshot = load_snapshot(
        Path::new(&config.defaults.captable_file),
        config.defaults.as_of,
        config.defaults.reference_price,
    )?;
    report_exclusions(&snapshot.excluded_convertibles);

    let analysis = waterfall::analyze(
        &snapshot.classes,
        scenario.exit_amount,
        Some(scenario.stacking_order.as_slice()),
    )?;

    render(&analysis, args.json)
}

// ==============================================================================
// Helpers
// ==============================================================================

fn load_snapshot(
    path: &Path,
    as_of: NaiveDate,
    reference_price: Decimal,
) -> anyhow::Result<CapSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading cap table {}", path.display()))?;
    let table: CapTable = serde_json::from_str(&raw).context("parsing cap table JSON")?;

    tracing::debug!(
        company = %table.company_name,
        classes = table.share_classes.len(),
        %as_of,
        "assembling capitalization snapshot"
    );

    let snapshot = SnapshotBuilder::new(as_of, reference_price).build(&table)?;
    Ok(snapshot)
}

fn parse_order(order: Option<&str>) -> anyhow::Result<Option<Vec<Uuid>>> {
    match order {
        None => Ok(None),
        Some(raw) => {
            let ids = raw
                .split(',')
                .map(|id| Uuid::parse_str(id.trim()))
                .collect::<Result<Vec<_>, _>>()
                .context("parsing --order share class IDs")?;
            Ok(Some(ids))
        }
    }
}

fn report_exclusions(excluded: &[String]) {
    for reason in excluded {
        println!("Excluded from conversion: {reason}");
    }
}

fn render(analysis: &WaterfallAnalysis, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Class",
        "Shares",
        "Preference",
        "Participation",
        "Total",
        "Per share",
        "ROI",
        "Capped",
    ]);
    for allocation in &analysis.allocations {
        table.add_row(vec![
            allocation.class_name.clone(),
            allocation.total_shares.to_string(),
            allocation.liquidation_preference.to_string(),
            allocation.participation_proceeds.to_string(),
            allocation.total_proceeds.to_string(),
            allocation.per_share_value.to_string(),
            allocation
                .roi_multiple
                .map(|roi| format!("{roi}x"))
                .unwrap_or_else(|| "-".to_string()),
            if allocation.participation_capped {
                "yes".to_string()
            } else {
                String::new()
            },
        ]);
    }

    println!("Exit amount: {}", analysis.exit_amount);
    println!("{table}");
    println!("Unallocated proceeds: {}", analysis.unallocated_proceeds);
    println!(
        "Breakeven: {} ({})",
        analysis.breakeven.exit_value, analysis.breakeven.description
    );
    Ok(())
}
