//! Process command - extract data from a single invoice image.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use rekap_core::audit::audit_record;
use rekap_core::{Document, ExtractionClient, ExtractionResult, InvoiceExtractor, RowTable, Schema};

use super::{apply_overrides, load_config, VariantArg};
use crate::export;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image (jpg, jpeg, png)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Prompt and column layout
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Read the instruction prompt from a file
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Report arithmetic inconsistencies in the extracted data
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON record
    Json,
    /// Tab-separated rows
    Tsv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, args.variant, args.prompt_file.as_deref())?;
    let api_key = config.api_key()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message("Reading invoice...");
    pb.enable_steady_tick(std::time::Duration::from_millis(120));

    let document = Document::from_path(&args.input)?;
    let client = ExtractionClient::new(config.service.clone(), &config.extraction, api_key)?;
    let result = client.extract(&document).await;

    pb.finish_and_clear();

    if let Some(error) = &result.error {
        anyhow::bail!("Extraction failed for {}: {}", result.filename, error);
    }

    if args.validate {
        let issues = audit_record(&result.record);
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_result(&result, &config.extraction.variant.schema(), args.format)?;

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

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_result(result: &ExtractionResult, schema: &Schema, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Tsv => {
            let mut table = RowTable::new(*schema);
            table.push_result(result);
            export::tsv::render(schema, table.data_rows())
        }
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_text(result: &ExtractionResult) -> String {
    let record = &result.record;
    let mut output = String::new();

    output.push_str(&format!("File: {}\n", result.filename));
    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    output.push_str(&format!("Date: {}\n", record.date));
    output.push_str(&format!("Vendor: {}\n", record.vendor));
    output.push_str(&format!("Buyer: {}\n", record.buyer));
    output.push('\n');

    if record.items.is_empty() {
        let list = record.item_list_text();
        if !list.is_empty() {
            output.push_str(&format!("Items: {}\n", list));
        }
    } else {
        output.push_str("Items:\n");
        for item in &record.items {
            output.push_str(&format!(
                "  {} | {} x {} = {}\n",
                item.name,
                item.quantity.normalize(),
                item.unit_price.normalize(),
                item.subtotal.normalize()
            ));
        }
    }

    output.push_str(&format!("\nTotal: {}\n", record.invoice_total.normalize()));

    if !record.audit_note.is_empty() {
        output.push_str(&format!("\nAudit note: {}\n", record.audit_note));
    }

    output
}
