use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use pr_export::config::Config;
use pr_export::constants;
use pr_export::logging;
use pr_export::metrics;
use pr_export::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "pr-export")]
#[command(about = "Export pull request datasets to row-capped CSV products")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (defaults to ./pr_export.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all five products (the default when no subcommand is given)
    Run {
        /// Directory holding the four source parquet files
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Root under which each product gets its own folder
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Maximum data rows per CSV file before splitting into parts
        #[arg(long)]
        max_rows: Option<usize>,
        /// Skip writing run_summary.json
        #[arg(long)]
        no_manifest: bool,
    },
    /// Print the effective security keyword vocabulary
    Keywords,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let log_dir = std::env::var("PR_EXPORT_LOG_DIR")
        .unwrap_or_else(|_| constants::DEFAULT_LOG_DIR.to_string());
    let _guard = logging::init_logging(&log_dir);
    metrics::init_metrics();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(cli.config.as_deref()).context("loading configuration")?;

    match cli.command.unwrap_or(Commands::Run {
        data_dir: None,
        output_dir: None,
        max_rows: None,
        no_manifest: false,
    }) {
        Commands::Run {
            data_dir,
            output_dir,
            max_rows,
            no_manifest,
        } => {
            if let Some(dir) = data_dir {
                config.paths.data_dir = dir;
            }
            if let Some(dir) = output_dir {
                config.paths.output_dir = dir;
            }
            if let Some(max) = max_rows {
                config.output.max_rows_per_file = max;
            }
            if no_manifest {
                config.output.write_manifest = false;
            }

            info!(
                data_dir = %config.paths.data_dir.display(),
                output_dir = %config.paths.output_dir.display(),
                max_rows_per_file = config.output.max_rows_per_file,
                "Starting export"
            );
            match Pipeline::run(&config) {
                Ok(report) => {
                    metrics::write_metrics_snapshot(&config.paths.output_dir)
                        .context("writing metrics snapshot")?;
                    info!(
                        products = report.products.len(),
                        duration_secs = report.duration_secs,
                        "Export finished"
                    );
                }
                Err(e) => {
                    error!("Export failed: {}", e);
                    return Err(e).context("export pipeline failed");
                }
            }
        }
        Commands::Keywords => {
            config.validate()?;
            for keyword in &config.security.keywords {
                println!("{keyword}");
            }
        }
    }
    Ok(())
}
