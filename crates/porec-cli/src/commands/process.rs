//! Process command - reconcile a single order PDF.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use porec_core::{LifecycleState, PdfExtractor, Reconciler, ResolvedOrder};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input order PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Reference dataset (clients, catalog, aliases, branches)
    #[arg(short, long)]
    data: PathBuf,

    /// Client the order belongs to
    #[arg(long)]
    client: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Reconcile without persisting
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let store = super::load_store(&args.data)?;
    let reconciler = Reconciler::new(&store).with_config(config);

    let data = fs::read(&args.input)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;
    let page_texts = extractor.page_texts()?;
    debug!("PDF has {} pages", extractor.page_count());

    let order = if args.dry_run {
        reconciler.reconcile(&page_texts, &args.client)?
    } else {
        let (order, saved) = reconciler.process(&page_texts, &args.client)?;
        println!(
            "{} Order {} persisted ({})",
            style("✓").green(),
            saved.order_number,
            state_label(saved.lifecycle_state)
        );
        order
    };

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&order)?,
        OutputFormat::Text => format_order_text(&order),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if order.lifecycle_state == LifecycleState::NeedsCorrection {
        eprintln!(
            "{} Order needs correction: {} incomplete item(s){}",
            style("!").yellow(),
            order.incomplete_items().len(),
            if order.has_branch_error() {
                ", branch unresolved"
            } else {
                ""
            }
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn state_label(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::Ready => "ready",
        LifecycleState::NeedsCorrection => "needs correction",
    }
}

pub fn format_order_text(order: &ResolvedOrder) -> String {
    let mut output = String::new();

    output.push_str(&format!("Branch: {}\n", order.branch_name));
    if let Some(po) = &order.purchase_order_number {
        output.push_str(&format!("PO number: {}\n", po));
    }
    output.push_str(&format!("State: {}\n", state_label(order.lifecycle_state)));
    output.push('\n');

    output.push_str("Items:\n");
    for item in &order.items {
        output.push_str(&format!(
            "  {:>4} {:<10} {:<40} {:<10} {}\n",
            item.quantity,
            item.unit,
            item.description,
            item.sku.as_deref().unwrap_or("-"),
            item.warehouse_code.as_deref().unwrap_or("-"),
        ));
    }

    output.push('\n');
    output.push_str(&format!("Total: {}\n", order.total));
    output
}
