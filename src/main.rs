use std::path::PathBuf;
use anyhow::{Result, Context};
use clap::{Parser, Subcommand};
use log::{info, warn};

use barcode_confirm::database::{Inventory, ReferenceSet, ReferenceStorage};
use barcode_confirm::scan::replay::{BatchReplayer, FrameReplayer, ReplayReport, ScanEvent};
use barcode_confirm::scan::reactions::InventoryAction;
use barcode_confirm::utils::logging;
use barcode_confirm::ScannerConfig;

/// Confirm, deduplicate and classify barcodes from recorded detector frames
#[derive(Debug, Parser)]
#[command(name = "barcode-confirm", version, about)]
struct Cli {
    /// Config file (.toml, .yaml or .yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reference database JSON, overrides the config
    #[arg(short, long, global = true)]
    reference: Option<PathBuf>,

    /// Agreeing frames needed to confirm a code, overrides the config
    #[arg(long, global = true)]
    required_frames: Option<usize>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging when no log config is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a single frame log
    Replay {
        /// Frame log, one `<format>:<code>` or `-` per line
        frame_log: PathBuf,
    },

    /// Replay every .frames file under a directory, one session per file
    Batch {
        dir: PathBuf,

        /// Worker threads, overrides the config
        #[arg(short, long)]
        threads: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ScannerConfig::load_or_default(cli.config.as_deref())?;
    if let Some(reference) = &cli.reference {
        config.reference_path = Some(reference.clone());
    }
    if let Some(frames) = cli.required_frames {
        config.required_frames = frames;
    }
    if let Command::Batch { threads: Some(threads), .. } = &cli.command {
        config.parallel_threads = Some(*threads);
    }
    config.validate()?;

    logging::init_logging(config.log_config.as_deref(), cli.verbose)?;

    let reference = match &config.reference_path {
        Some(path) => ReferenceStorage::new(path).load_or_empty_async().await,
        None => {
            warn!("No reference database configured, every new code will be reported as unknown");
            ReferenceSet::default()
        }
    };

    let replayer = FrameReplayer::new(config.scan_options(), config.reactions);
    let inventory = Inventory::new();

    match cli.command {
        Command::Replay { frame_log } => {
            let report = tokio::task::spawn_blocking(move || replayer.replay_file(&frame_log, &reference, &inventory))
                .await
                .context("replay task failed to join")??;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Batch { dir, .. } => {
            let batch = tokio::task::spawn_blocking(move || {
                BatchReplayer::new(replayer).replay_directory(&dir, &reference, &inventory)
            })
            .await
            .context("batch task failed to join")??;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
            } else {
                for report in &batch.reports {
                    print_report(report);
                }
                for failed in &batch.failed {
                    println!("FAILED {}: {}", failed.path.display(), failed.error);
                }
            }
            info!("Batch finished with {} failures", batch.failed.len());
        }
    }

    Ok(())
}

fn print_report(report: &ReplayReport) {
    if let Some(source) = &report.source {
        println!("== {}", source.display());
    }
    for event in &report.events {
        println!("{}", describe_event(event));
    }
    println!(
        "{} frames, {} confirmations, {} new, {} repeats",
        report.stats.frames,
        report.stats.confirmations,
        report.stats.new_codes(),
        report.stats.duplicates
    );
}

fn describe_event(event: &ScanEvent) -> String {
    let action = match &event.action {
        Some(InventoryAction::CreateProduct { barcode, .. }) => format!(" -> create product {}", barcode),
        Some(InventoryAction::EditProduct { id }) => format!(" -> edit product {}", id),
        None => String::new(),
    };
    format!("frame {:>6}  {:<9} {}{}", event.frame, event.format, event.classification, action)
}
