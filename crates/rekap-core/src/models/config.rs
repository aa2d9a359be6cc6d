//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

use crate::extraction::SchemaVariant;

/// Main configuration for the rekap pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RekapConfig {
    /// External model service configuration.
    pub service: ServiceConfig,

    /// Prompt and schema configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,

    /// Spreadsheet export configuration.
    pub export: ExportConfig,
}

/// Chat-completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,

    /// Vision-capable model identifier.
    pub model: String,

    /// Sampling temperature; kept low to reduce variance between runs.
    pub temperature: f32,

    /// Maximum completion length in tokens.
    pub max_tokens: u32,

    /// Request timeout in seconds. `None` keeps the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://integrate.api.nvidia.com/v1".to_string(),
            model: "google/gemma-3-27b-it".to_string(),
            temperature: 0.1,
            max_tokens: 1024,
            timeout_secs: None,
            api_key_env: "NVIDIA_API_KEY".to_string(),
        }
    }
}

/// Prompt and output schema selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Which prompt/column schema pair to use.
    pub variant: SchemaVariant,

    /// Custom instruction text replacing the variant's default prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl ExtractionConfig {
    /// Get the instruction prompt, using custom or the variant default.
    pub fn prompt(&self) -> &str {
        self.prompt
            .as_deref()
            .unwrap_or_else(|| self.variant.default_prompt())
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum documents per batch (0 = unlimited).
    pub max_documents: usize,

    /// Append a grand-total row after all data rows.
    pub grand_total: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_documents: 0,
            grand_total: true,
        }
    }
}

/// Spreadsheet export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Worksheet name.
    pub sheet_name: String,

    /// Default workbook file name.
    pub file_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "BatchData".to_string(),
            file_name: "Rekapan_Invoice_Batch.xlsx".to_string(),
        }
    }
}

impl RekapConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Read the API key from the configured environment variable.
    ///
    /// Blank values count as missing.
    pub fn api_key(&self) -> crate::Result<String> {
        match std::env::var(&self.service.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(crate::RekapError::Config(format!(
                "{} is not set; export it or add it to a .env file",
                self.service.api_key_env
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: RekapConfig =
            serde_json::from_str(r#"{"service": {"model": "other/model"}, "batch": {"grand_total": false}}"#)
                .unwrap();

        assert_eq!(config.service.model, "other/model");
        assert_eq!(config.service.base_url, "https://integrate.api.nvidia.com/v1");
        assert_eq!(config.service.max_tokens, 1024);
        assert!(!config.batch.grand_total);
        assert_eq!(config.batch.max_documents, 0);
        assert_eq!(config.export.sheet_name, "BatchData");
        assert_eq!(config.extraction.variant, SchemaVariant::Audited);
    }

    #[test]
    fn test_custom_prompt_overrides_variant() {
        let mut extraction = ExtractionConfig::default();
        assert_eq!(extraction.prompt(), SchemaVariant::Audited.default_prompt());

        extraction.prompt = Some("Extract everything.".to_string());
        assert_eq!(extraction.prompt(), "Extract everything.");
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let mut config = RekapConfig::default();
        config.service.api_key_env = "REKAP_TEST_KEY_THAT_IS_NEVER_SET".to_string();

        let err = config.api_key().unwrap_err();
        assert!(err.to_string().contains("REKAP_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("rekap-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = RekapConfig::default();
        config.extraction.variant = SchemaVariant::Summary;
        config.service.timeout_secs = Some(30);
        config.save(&path).unwrap();

        let loaded = RekapConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.variant, SchemaVariant::Summary);
        assert_eq!(loaded.service.timeout_secs, Some(30));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
