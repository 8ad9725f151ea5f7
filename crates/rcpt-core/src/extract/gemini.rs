//! Primary structured extraction via the Gemini generateContent API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::config::GeminiConfig;
use crate::models::receipt::ReceiptCandidate;

use super::rules::patterns::{FENCED_BLOCK, FENCED_JSON};

/// Trait for structured receipt extraction from OCR text.
///
/// The pipeline only depends on this seam, so failure modes can be
/// simulated without a network.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Produce an unvalidated receipt candidate from raw OCR text.
    async fn extract(&self, ocr_text: &str) -> Result<ReceiptCandidate, ExtractionError>;
}

/// Gemini-backed structured extractor.
///
/// Sends the OCR text with a strict JSON-schema prompt, once, with
/// near-greedy sampling. Any failure - transport, non-success status,
/// missing candidate content, or undecodable JSON - is reported as an
/// [`ExtractionError`] for the pipeline to recover from.
pub struct GeminiExtractor {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

impl GeminiExtractor {
    pub fn new(config: GeminiConfig, api_key: impl Into<String>) -> Result<Self, ExtractionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }

    async fn generate(&self, ocr_text: &str) -> Result<String, ExtractionError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![TextPart {
                    text: build_prompt(ocr_text),
                }],
            }],
            generation_config: SamplingConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(ExtractionError::ServiceUnavailable(
                response.status().as_u16(),
            ));
        }

        let decoded: GenerateResponse = response.json().await?;

        decoded
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or(ExtractionError::MissingStructuredOutput)
    }
}

#[async_trait]
impl StructuredExtractor for GeminiExtractor {
    async fn extract(&self, ocr_text: &str) -> Result<ReceiptCandidate, ExtractionError> {
        let raw = self.generate(ocr_text).await?;
        debug!(response_len = raw.len(), "structured extraction response");

        parse_candidate(&raw)
    }
}

/// Decode the service's response text into a receipt candidate.
///
/// The model frequently wraps its JSON in a markdown code fence; the
/// annotated form is stripped first, then a bare fence, and failing both
/// the whole text is treated as raw JSON.
pub fn parse_candidate(response_text: &str) -> Result<ReceiptCandidate, ExtractionError> {
    let json_text = strip_code_fence(response_text);
    let candidate: ReceiptCandidate = serde_json::from_str(json_text)?;
    require_core_fields(&candidate)?;

    Ok(candidate)
}

fn strip_code_fence(text: &str) -> &str {
    if text.contains("```json") {
        if let Some(caps) = FENCED_JSON.captures(text) {
            return caps.get(1).map(|m| m.as_str()).unwrap_or(text);
        }
    } else if text.contains("```") {
        if let Some(caps) = FENCED_BLOCK.captures(text) {
            return caps.get(1).map(|m| m.as_str()).unwrap_or(text);
        }
    }

    text
}

/// A decoded object missing any of the core identification fields is not
/// trusted; the pipeline falls back to heuristics instead of silently
/// defaulting them.
fn require_core_fields(candidate: &ReceiptCandidate) -> Result<(), ExtractionError> {
    if candidate
        .store_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .is_none()
    {
        return Err(ExtractionError::MissingField("storeName"));
    }

    if candidate
        .date
        .as_deref()
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .is_none()
    {
        return Err(ExtractionError::MissingField("date"));
    }

    match &candidate.total {
        None | Some(serde_json::Value::Null) => Err(ExtractionError::MissingField("total")),
        Some(_) => Ok(()),
    }
}

fn build_prompt(ocr_text: &str) -> String {
    format!(
        r#"Analyze this receipt text and extract the following information in JSON format. Be very careful with number parsing and currency detection. Support receipts from Canada, USA, and other countries:

Required JSON structure:
{{
  "storeName": "string",
  "date": "YYYY-MM-DD",
  "subtotal": number,
  "taxes": number,
  "total": number,
  "items": ["item1", "item2", ...],
  "confidence": number (0-1)
}}

Rules:
- Extract store/merchant name from the top of the receipt
- Parse date in YYYY-MM-DD format
- Identify subtotal (before taxes)
- Calculate or extract tax amount
- Find the final total amount
- List individual items purchased (up to 10 most relevant)
- Provide confidence score based on data quality
- Handle different currencies (CAD, USD, EUR, etc.)
- Support various receipt formats (grocery, restaurant, retail, gas station)

Receipt text:
{ocr_text}"#
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    generation_config: SamplingConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SamplingConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const METRO_JSON: &str = r#"{"storeName":"Metro","date":"2024-03-01","subtotal":10,"taxes":1.3,"total":11.3,"items":[],"confidence":0.9}"#;

    #[test]
    fn parses_json_annotated_fence() {
        let wrapped = format!("```json\n{METRO_JSON}\n```");
        let candidate = parse_candidate(&wrapped).unwrap();

        assert_eq!(candidate.store_name.as_deref(), Some("Metro"));
        assert_eq!(candidate.date.as_deref(), Some("2024-03-01"));
        assert_eq!(candidate.subtotal, Some(Value::from(10)));
        assert_eq!(candidate.taxes, Some(Value::from(1.3)));
        assert_eq!(candidate.total, Some(Value::from(11.3)));
        assert_eq!(candidate.items, Some(Value::Array(Vec::new())));
        assert_eq!(candidate.confidence, Some(Value::from(0.9)));
    }

    #[test]
    fn parses_bare_fence() {
        let wrapped = format!("```\n{METRO_JSON}\n```");
        let candidate = parse_candidate(&wrapped).unwrap();

        assert_eq!(candidate.store_name.as_deref(), Some("Metro"));
    }

    #[test]
    fn parses_unfenced_json() {
        let candidate = parse_candidate(METRO_JSON).unwrap();
        assert_eq!(candidate.store_name.as_deref(), Some("Metro"));
    }

    #[test]
    fn undecodable_output_is_malformed() {
        let result = parse_candidate("Sure! Here is the receipt data you asked for.");
        assert!(matches!(
            result,
            Err(ExtractionError::MalformedStructuredOutput(_))
        ));
    }

    #[test]
    fn fence_without_valid_json_is_malformed() {
        let result = parse_candidate("```json\nnot json at all\n```");
        assert!(matches!(
            result,
            Err(ExtractionError::MalformedStructuredOutput(_))
        ));
    }

    #[test]
    fn missing_store_name_is_rejected() {
        let result =
            parse_candidate(r#"{"date":"2024-03-01","total":11.3}"#);
        assert!(matches!(
            result,
            Err(ExtractionError::MissingField("storeName"))
        ));
    }

    #[test]
    fn missing_total_is_rejected() {
        let result = parse_candidate(r#"{"storeName":"Metro","date":"2024-03-01"}"#);
        assert!(matches!(result, Err(ExtractionError::MissingField("total"))));
    }

    #[test]
    fn prompt_embeds_the_receipt_text() {
        let prompt = build_prompt("METRO\nTOTAL 11.30");
        assert!(prompt.contains("METRO\nTOTAL 11.30"));
        assert!(prompt.contains("\"storeName\": \"string\""));
    }
}
