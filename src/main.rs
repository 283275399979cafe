use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

use exoprep::app::prepare_use_case::PrepareUseCase;
use exoprep::infra::{write_aligned_csv, CsvOutputAdapter};
use exoprep::pipeline::{align, AlignConfig};
use exoprep::{logging, observability, table, PrepConfig};

#[derive(Parser)]
#[command(name = "exoprep")]
#[command(about = "Reconcile KOI, K2 and TOI survey tables into canonical features")]
#[command(version)]
struct Cli {
    /// Print Prometheus metrics to stdout before exiting
    #[arg(long, global = true)]
    metrics: bool,
    /// Also write JSON logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit, filter and split survey exports into train / valid / candidate files
    Prepare {
        /// Input files (comma-separated). Missing files are skipped
        #[arg(long, value_delimiter = ',', required = true)]
        csv_paths: Vec<PathBuf>,
        /// Maximum missing fraction for a column to be kept
        #[arg(long)]
        null_cut: Option<f64>,
        /// Fraction of labelled rows held out for validation
        #[arg(long)]
        test_size: Option<f64>,
        #[arg(long)]
        random_state: Option<u64>,
        /// Minimum known canonical values per row
        #[arg(long)]
        min_raw_nonnull: Option<usize>,
        #[arg(long, default_value = "processed")]
        out_dir: PathBuf,
        /// TOML file with default thresholds
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Align an inference table to the canonical features
    Align {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "aligned.csv")]
        output: PathBuf,
        #[arg(long)]
        min_raw_nonnull: Option<usize>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<PrepConfig> {
    match path {
        Some(path) => PrepConfig::load(path)
            .with_context(|| format!("Failed to load config '{}'", path.display())),
        None => Ok(PrepConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.log_dir.as_deref());

    let metrics_handle = if cli.metrics {
        Some(observability::init().map_err(anyhow::Error::msg)?)
    } else {
        None
    };

    match cli.command {
        Commands::Prepare {
            csv_paths,
            null_cut,
            test_size,
            random_state,
            min_raw_nonnull,
            out_dir,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(v) = null_cut {
                config.null_pct_cut = v;
            }
            if let Some(v) = test_size {
                config.test_size = v;
            }
            if let Some(v) = random_state {
                config.random_state = v;
            }
            if let Some(v) = min_raw_nonnull {
                config.min_raw_nonnull = v;
            }
            config.validate()?;

            let output = CsvOutputAdapter::new(&out_dir)?;
            let use_case = PrepareUseCase::new(config, Box::new(output));
            let reports = use_case.run(&csv_paths)?;

            for report in &reports {
                println!("Processed '{}':", report.source.display());
                println!("  Mission: {}", report.meta.mission);
                println!("  Kept columns: {}", report.meta.kept_columns.len());
                println!("  Train (0/1): {}", report.meta.sizes.train);
                println!("  Valid: {}", report.meta.sizes.valid);
                println!("  Candidates: {}", report.meta.sizes.candidates);
            }
            println!("Outputs in {}", out_dir.display());
        }
        Commands::Align {
            input,
            output,
            min_raw_nonnull,
            config,
        } => {
            let span = info_span!("align", file = %input.display());
            let _enter = span.enter();

            let mut config = load_config(config.as_deref())?;
            if let Some(v) = min_raw_nonnull {
                config.min_raw_nonnull = v;
            }
            config.validate()?;

            let raw = table::load_path(&input)
                .with_context(|| format!("Failed to load '{}'", input.display()))?;
            let batch = align(&raw, &AlignConfig::from(&config))?;
            write_aligned_csv(&output, &batch)?;
            info!("Aligned {} of {} rows", batch.len(), raw.n_rows());
            println!("Wrote {} rows to {}", batch.len(), output.display());
        }
    }

    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }
    Ok(())
}
