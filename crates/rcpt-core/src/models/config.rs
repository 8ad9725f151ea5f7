//! Configuration structures for the scanning pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RcptError, Result};

/// Environment variable holding the provider API credential.
pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// Text recognition provider configuration.
    pub vision: VisionConfig,

    /// Structured extraction provider configuration.
    pub gemini: GeminiConfig,

    /// Heuristic extraction configuration.
    pub extraction: ExtractionConfig,

    /// HTTP endpoint configuration.
    pub server: ServerConfig,
}

/// Text recognition provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Annotation endpoint URL.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Structured extraction provider settings.
///
/// Sampling defaults are deliberately near-greedy to keep extraction
/// variance low.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL (version prefix included).
    pub endpoint: String,

    /// Model identifier.
    pub model: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Top-k sampling cutoff.
    pub top_k: u32,

    /// Nucleus sampling cutoff.
    pub top_p: f32,

    /// Output length bound.
    pub max_output_tokens: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            temperature: 0.1,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
            timeout_secs: 30,
        }
    }
}

/// Heuristic (fallback) extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Blended tax rate assumed when splitting a receipt total into
    /// subtotal and taxes. An approximation, not a regional tax table.
    #[serde(with = "rust_decimal::serde::float")]
    pub fallback_tax_rate: Decimal,

    /// Upper bound (exclusive) on amounts accepted from OCR text. Larger
    /// numbers are treated as order numbers or OCR garbage.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_sanity_limit: Decimal,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            fallback_tax_rate: Decimal::new(12, 2),
            amount_sanity_limit: Decimal::from(10_000),
        }
    }
}

/// HTTP endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RcptError::Config(format!("invalid config file: {e}")))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| RcptError::Config(format!("cannot serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Read the provider API credential from the environment.
///
/// The credential is required for both provider calls; its absence is a
/// fatal configuration error, not something the fallback path can repair.
pub fn google_api_key() -> Result<String> {
    std::env::var(API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| RcptError::Config(format!("{API_KEY_VAR} is not set")))
}
