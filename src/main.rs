use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use billmerge::config::{AppPaths, PipelinePaths, Settings};
use billmerge::services::{reconcile_or_log, ReconcileSummary, ReportService};

#[derive(Parser)]
#[command(
    name = "billmerge",
    version,
    about = "Merge Alipay and WeChat Pay bill exports into one report",
    long_about = "billmerge reads the CSV bill exports of Alipay and WeChat Pay, \
                  merges them into a single unified ledger table and renders a \
                  Markdown report with totals, per-category breakdowns and the \
                  full ledger in time order."
)]
struct Cli {
    /// Alipay export (overrides settings)
    #[arg(long, global = true, env = "BILLMERGE_ALIPAY")]
    alipay: Option<PathBuf>,

    /// WeChat Pay export (overrides settings)
    #[arg(long, global = true, env = "BILLMERGE_WECHAT")]
    wechat: Option<PathBuf>,

    /// Unified ledger table (overrides settings)
    #[arg(long, global = true)]
    unified: Option<PathBuf>,

    /// Markdown report (overrides settings)
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile both exports, then write the report (default)
    Run,

    /// Merge both exports into the unified table
    #[command(alias = "merge")]
    Reconcile,

    /// Render the report from an existing unified table
    Report,

    /// Write a default settings file
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let app_paths = AppPaths::new()?;
    let settings = Settings::load_or_create(&app_paths)?;
    let paths = PipelinePaths::from_settings(&settings).with_overrides(
        cli.alipay,
        cli.wechat,
        cli.unified,
        cli.report,
    );

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            reconcile(&settings, &paths);
            report(&settings, &paths)?;
        }
        Commands::Reconcile => {
            reconcile(&settings, &paths);
        }
        Commands::Report => {
            report(&settings, &paths)?;
        }
        Commands::Init => {
            settings.save(&app_paths)?;
            println!("Settings written to: {}", app_paths.settings_file().display());
            println!();
            println!("Edit the file to point at your exports, or pass --alipay/--wechat.");
        }
        Commands::Config => {
            println!("billmerge Configuration");
            println!("=======================");
            println!("Settings file: {}", app_paths.settings_file().display());
            println!();
            println!("Paths:");
            println!("  Alipay export:  {}", paths.alipay.display());
            println!("  WeChat export:  {}", paths.wechat.display());
            println!("  Unified table:  {}", paths.unified.display());
            println!("  Report:         {}", paths.report.display());
            println!();
            println!("Settings:");
            println!(
                "  Alipay layout:  skip {} rows, {}",
                settings.sources.alipay.skip_rows, settings.sources.alipay.encoding
            );
            println!(
                "  WeChat layout:  skip {} rows, {}",
                settings.sources.wechat.skip_rows, settings.sources.wechat.encoding
            );
            println!("  Placeholder:    {}", settings.placeholder);
            println!("  Currency:       {}", settings.currency_symbol);
            println!("  Fallback encoding: {}", settings.fallback_encoding);
        }
    }

    Ok(())
}

fn reconcile(settings: &Settings, paths: &PipelinePaths) -> Option<ReconcileSummary> {
    let summary = reconcile_or_log(settings, paths);
    match &summary {
        Some(s) => {
            println!(
                "Merged {} rows into {} (alipay: {} of {}, wechat: {} of {})",
                s.written,
                s.output.display(),
                s.alipay.retained,
                s.alipay.read,
                s.wechat.retained,
                s.wechat.read,
            );
        }
        None => {
            println!("Reconciliation skipped; unified table left unchanged.");
        }
    }
    summary
}

fn report(settings: &Settings, paths: &PipelinePaths) -> Result<()> {
    let summary = ReportService::new(settings).generate(paths)?;
    println!(
        "Report written to {} (expense {}, income {}, balance {})",
        paths.report.display(),
        summary.total_expense.format_with_symbol(&settings.currency_symbol),
        summary.total_income.format_with_symbol(&settings.currency_symbol),
        summary.balance.format_with_symbol(&settings.currency_symbol),
    );
    Ok(())
}
