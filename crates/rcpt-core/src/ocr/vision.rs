//! Google Vision API client for text recognition.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::VisionConfig;

use super::TextRecognizer;

/// HTTP client for the Vision `images:annotate` endpoint.
pub struct VisionClient {
    client: Client,
    config: VisionConfig,
    api_key: String,
}

impl VisionClient {
    pub fn new(config: VisionConfig, api_key: impl Into<String>) -> Result<Self, OcrError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TextRecognizer for VisionClient {
    async fn recognize(&self, image_base64: &str) -> Result<String, OcrError> {
        let url = format!("{}?key={}", self.config.endpoint, self.api_key);

        let request = AnnotateRequest {
            requests: vec![AnnotateEntry {
                image: ImageContent {
                    content: image_base64.to_string(),
                },
                features: vec![
                    Feature {
                        kind: "TEXT_DETECTION",
                        max_results: 1,
                    },
                    Feature {
                        kind: "DOCUMENT_TEXT_DETECTION",
                        max_results: 1,
                    },
                ],
            }],
        };

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(OcrError::Status(response.status().as_u16()));
        }

        let decoded: AnnotateResponse = response.json().await?;
        debug!("text recognition response received");

        decoded
            .responses
            .into_iter()
            .next()
            .and_then(|result| result.text_annotations.into_iter().next())
            .and_then(|annotation| annotation.description)
            .filter(|text| !text.trim().is_empty())
            .ok_or(OcrError::NoTextDetected)
    }
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateEntry>,
}

#[derive(Debug, Serialize)]
struct AnnotateEntry {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: Option<String>,
}
