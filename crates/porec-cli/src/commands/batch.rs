//! Batch command - reconcile every PDF matching a glob pattern.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use porec_core::{LifecycleState, PdfExtractor, Reconciler, ResolvedOrder};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Reference dataset (clients, catalog, aliases, branches)
    #[arg(short, long)]
    data: PathBuf,

    /// Client the orders belong to
    #[arg(long)]
    client: String,

    /// Output directory for per-order JSON
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Reconcile without persisting
    #[arg(long)]
    dry_run: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    order: Option<ResolvedOrder>,
    order_number: Option<u64>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let store = super::load_store(&args.data)?;
    let reconciler = Reconciler::new(&store).with_config(config);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let result = process_single_file(&path, &reconciler, &args);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match result {
            Ok((order, order_number)) => {
                results.push(ProcessResult {
                    path: path.clone(),
                    order: Some(order),
                    order_number,
                    error: None,
                    processing_time_ms,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path: path.clone(),
                        order: None,
                        order_number: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.order.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    let needs_correction = successful
        .iter()
        .filter(|r| {
            r.order
                .as_ref()
                .map(|o| o.lifecycle_state == LifecycleState::NeedsCorrection)
                .unwrap_or(false)
        })
        .count();

    for result in &successful {
        if let (Some(order), Some(output_dir)) = (&result.order, &args.output_dir) {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("order");
            let output_path = output_dir.join(format!("{}.json", output_name));
            fs::write(&output_path, serde_json::to_string_pretty(order)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful ({} need correction), {} failed",
        style(successful.len()).green(),
        style(needs_correction).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &PathBuf,
    reconciler: &Reconciler<'_, porec_core::MemoryStore>,
    args: &BatchArgs,
) -> anyhow::Result<(ResolvedOrder, Option<u64>)> {
    let data = fs::read(path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;
    let page_texts = extractor.page_texts()?;

    if args.dry_run {
        Ok((reconciler.reconcile(&page_texts, &args.client)?, None))
    } else {
        let (order, saved) = reconciler.process(&page_texts, &args.client)?;
        Ok((order, Some(saved.order_number)))
    }
}

fn write_summary(path: &PathBuf, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "order_number",
        "branch",
        "state",
        "items",
        "incomplete_items",
        "total",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(order) = &result.order {
            let state = match order.lifecycle_state {
                LifecycleState::Ready => "ready",
                LifecycleState::NeedsCorrection => "needs_correction",
            };
            wtr.write_record([
                filename,
                "success",
                &result
                    .order_number
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
                &order.branch_name,
                state,
                &order.items.len().to_string(),
                &order.incomplete_items().len().to_string(),
                &order.total.to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
