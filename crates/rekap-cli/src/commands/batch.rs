//! Batch processing command for multiple invoice images.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use rekap_core::audit::audit_record;
use rekap_core::models::document::is_supported_image;
use rekap_core::{BatchEvent, BatchProcessor, BatchReport, Document, ExtractionClient, ExtractionResult};

use super::{apply_overrides, load_config, VariantArg};
use crate::export;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob patterns (jpg, jpeg, png), processed in order
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Excel workbook to write (default from config: Rekapan_Invoice_Batch.xlsx)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the table as tab-separated text ("-" for stdout)
    #[arg(long)]
    tsv: Option<PathBuf>,

    /// Also write the raw extraction results as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Prompt and column layout
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Read the instruction prompt from a file
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Do not append the grand-total row
    #[arg(long)]
    no_grand_total: bool,

    /// Report arithmetic inconsistencies in the extracted data
    #[arg(long)]
    validate: bool,
}

/// Raw results written by `--json`.
#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    variant: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    total: Decimal,
    results: &'a [ExtractionResult],
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_overrides(&mut config, args.variant, args.prompt_file.as_deref())?;

    // Credentials are required before anything is read or sent.
    let api_key = config.api_key()?;

    let files = expand_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching image files found for: {}", args.inputs.join(" "));
    }

    eprintln!(
        "{} Found {} files to process ({} layout)",
        style("ℹ").blue(),
        files.len(),
        config.extraction.variant
    );

    let documents = files
        .iter()
        .map(|path| {
            Document::from_path(path).with_context(|| format!("Could not read {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let client = ExtractionClient::new(config.service.clone(), &config.extraction, api_key)?;
    let processor = BatchProcessor::new(client, config.extraction.variant.schema())
        .with_grand_total(config.batch.grand_total && !args.no_grand_total)
        .with_max_documents(config.batch.max_documents);

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let report = processor
        .run(&documents, |event| match event {
            BatchEvent::Started { index, total, filename } => {
                pb.set_message(format!("Reading file {} of {}: {}", index + 1, total, filename));
            }
            BatchEvent::Finished { .. } => pb.inc(1),
        })
        .await?;

    pb.finish_and_clear();

    // Write outputs
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    export::xlsx::write_workbook(&output, &config.export.sheet_name, &report.schema, &report.rows)
        .with_context(|| format!("Could not write {}", output.display()))?;
    eprintln!("{} Workbook written to {}", style("✓").green(), output.display());

    if let Some(tsv_path) = &args.tsv {
        let text = export::tsv::render(&report.schema, &report.rows)?;
        if tsv_path.as_os_str() == "-" {
            print!("{}", text);
        } else {
            fs::write(tsv_path, text)?;
            eprintln!("{} TSV written to {}", style("✓").green(), tsv_path.display());
        }
    }

    if let Some(json_path) = &args.json {
        write_json(json_path, &report, &config.extraction.variant.to_string())?;
        eprintln!("{} Results written to {}", style("✓").green(), json_path.display());
    }

    if args.validate {
        print_validation(&report);
    }

    print_summary(&report, start);

    Ok(())
}

/// Expand paths and globs into image files, keeping argument order.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        let candidates: Vec<PathBuf> = if path.is_file() {
            vec![path.to_path_buf()]
        } else {
            glob(input)?.filter_map(|r| r.ok()).filter(|p| p.is_file()).collect()
        };

        for candidate in candidates {
            if is_supported_image(&candidate) {
                files.push(candidate);
            } else {
                warn!("Skipping unsupported file {}", candidate.display());
            }
        }
    }

    debug!("Expanded {} inputs into {} files", inputs.len(), files.len());
    Ok(files)
}

fn write_json(path: &Path, report: &BatchReport, variant: &str) -> anyhow::Result<()> {
    let json = JsonReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        variant: variant.to_string(),
        total: report.total,
        results: &report.results,
    };
    fs::write(path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

fn print_validation(report: &BatchReport) {
    let mut any = false;

    for result in report.results.iter().filter(|r| !r.is_error()) {
        let issues = audit_record(&result.record);
        if issues.is_empty() {
            continue;
        }
        if !any {
            eprintln!();
            eprintln!("{}", style("Validation issues:").yellow());
            any = true;
        }
        eprintln!("  {}:", result.filename);
        for issue in &issues {
            eprintln!("    - {}", issue);
        }
    }

    if !any {
        eprintln!("{} No arithmetic issues found", style("✓").green());
    }
}

fn print_summary(report: &BatchReport, start: Instant) {
    eprintln!();
    eprintln!(
        "{} Processed {} files into {} rows in {:?}",
        style("✓").green(),
        report.results.len(),
        report.rows.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed, grand total {}",
        style(report.succeeded()).green(),
        style(report.failed()).red(),
        report.total.normalize()
    );

    let failed: Vec<_> = report.results.iter().filter(|r| r.is_error()).collect();
    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in failed {
            eprintln!(
                "  - {}: {}",
                result.filename,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
