//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use rekap_core::{RekapConfig, SchemaVariant};
use tracing::debug;

/// Prompt/schema variant selectable on the command line.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum VariantArg {
    /// One row per invoice with the invoice total
    Summary,
    /// One row per line item
    Itemized,
    /// One row per line item, arithmetic corrected by the model
    Audited,
}

impl From<VariantArg> for SchemaVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Summary => SchemaVariant::Summary,
            VariantArg::Itemized => SchemaVariant::Itemized,
            VariantArg::Audited => SchemaVariant::Audited,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rekap")
        .join("config.json")
}

/// Resolve the config file: the `--config` flag, else the default location.
pub fn config_path(config_path: Option<&str>) -> PathBuf {
    config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when the file is absent.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RekapConfig> {
    let path = self::config_path(config_path);
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(RekapConfig::from_file(&path)?)
    } else {
        debug!("No config at {}, using defaults", path.display());
        Ok(RekapConfig::default())
    }
}

/// Apply `--variant` and `--prompt-file` overrides.
pub fn apply_overrides(
    config: &mut RekapConfig,
    variant: Option<VariantArg>,
    prompt_file: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(variant) = variant {
        config.extraction.variant = variant.into();
    }
    if let Some(path) = prompt_file {
        let prompt = fs::read_to_string(path)?;
        if prompt.trim().is_empty() {
            anyhow::bail!("Prompt file is empty: {}", path.display());
        }
        config.extraction.prompt = Some(prompt);
    }
    Ok(())
}
