use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use wardead_clean::app::patch_use_case::PatchUseCase;
use wardead_clean::app::ports::{RecordSinkPort, RecordSourcePort};
use wardead_clean::app::rebuild_use_case::RebuildUseCase;
use wardead_clean::app::report::RunReport;
use wardead_clean::config::{BatchFailurePolicy, PipelineSettings, SupabaseConfig};
use wardead_clean::infra::ndjson_sink::NdjsonSink;
use wardead_clean::infra::supabase_rest::SupabaseRest;
use wardead_clean::logging;

#[derive(Parser)]
#[command(name = "wardead_clean")]
#[command(about = "Normalize Staffordshire war-dead records stored in Supabase")]
#[command(version)]
struct Cli {
    /// Optional TOML file with table names, batch size and failure policy
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Rows per fetched page and per written batch
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    /// Table the raw records are read from (and patched in)
    #[arg(long, global = true)]
    source_table: Option<String>,

    /// What to do when the store rejects a batch
    #[arg(long, global = true, value_enum)]
    on_batch_error: Option<BatchFailurePolicy>,

    /// Write rows as NDJSON into this directory instead of sending them
    #[arg(long, global = true)]
    dry_run: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean every row and insert the result into a separate table
    Rebuild {
        /// Destination table for the cleaned rows
        #[arg(long)]
        target_table: Option<String>,
    },
    /// Upsert only the normalized `iso_date` back onto the source rows
    Patch,
}

fn resolve_settings(cli: &Cli) -> Result<PipelineSettings> {
    let mut settings = match &cli.config {
        Some(path) => PipelineSettings::load(path)?,
        None => PipelineSettings::default(),
    };
    if let Some(batch_size) = cli.batch_size {
        settings.batch_size = batch_size;
    }
    if let Some(table) = &cli.source_table {
        settings.source_table = table.clone();
    }
    if let Some(policy) = cli.on_batch_error {
        settings.on_batch_error = policy;
    }
    if let Commands::Rebuild { target_table: Some(table) } = &cli.command {
        settings.target_table = table.clone();
    }
    settings.validate()?;
    Ok(settings)
}

fn print_report(report: &RunReport) {
    println!("\n📊 Results for {}:", report.mode);
    println!("   Fetched: {}", report.fetched);
    println!("   Normalized: {}", report.normalized);
    println!("   Unparseable dates: {}", report.unparseable_dates);
    if report.skipped_without_id > 0 {
        println!("   Skipped (no id): {}", report.skipped_without_id);
    }
    println!("   Batches written: {}", report.write.batches_written);
    println!("   Rows written: {}", report.write.rows_written);

    if !report.write.failures.is_empty() {
        println!("\n⚠️  Failed batches:");
        for failure in &report.write.failures {
            println!("   - batch {} ({} rows): {}", failure.first_row, failure.rows, failure.error);
        }
    }
    if report.write.batches_skipped > 0 {
        println!("   Not attempted after abort: {}", report.write.batches_skipped);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(cli.verbose);

    let settings = resolve_settings(&cli)?;
    info!(?settings, "Starting run");

    let supabase = SupabaseConfig::from_env().context("loading Supabase configuration")?;
    let rest = Arc::new(SupabaseRest::new(&supabase)?);
    let source: Arc<dyn RecordSourcePort> = rest.clone();
    let sink: Arc<dyn RecordSinkPort> = match &cli.dry_run {
        Some(dir) => Arc::new(NdjsonSink::new(dir)?),
        None => rest,
    };

    let report = match cli.command {
        Commands::Rebuild { .. } => {
            println!("🧹 Rebuilding '{}' from '{}'...", settings.target_table, settings.source_table);
            RebuildUseCase::new(source, sink, settings).run().await?
        }
        Commands::Patch => {
            println!("🚀 Patching 'iso_date' in '{}'...", settings.source_table);
            PatchUseCase::new(source, sink, settings).run().await?
        }
    };

    print_report(&report);
    if !report.succeeded() {
        error!("{} batches failed", report.write.failures.len());
        anyhow::bail!("{} run finished with failed batches", report.mode);
    }

    println!("🎉 Done.");
    Ok(())
}
