//! HTTP endpoint for receipt scanning.
//!
//! Accepts `POST /scan-receipt` with a base64 image, runs OCR and the
//! extraction chain, and answers with the structured receipt envelope.
//! Pre-flight requests and all responses carry permissive CORS headers so
//! browser clients can call the endpoint directly.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use clap::Parser;
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use rcpt_core::models::config::ExtractionConfig;
use rcpt_core::{
    google_api_key, scan_receipt, GeminiExtractor, RcptConfig, RcptError, ScanFailure,
    ScanOutcome, StructuredExtractor, TextRecognizer, VisionClient, API_KEY_VAR,
};

/// Receipt scanning HTTP endpoint
#[derive(Parser)]
#[command(name = "rcpt-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    /// Bind address (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,
}

/// Shared handler state.
///
/// `providers` is `None` when the API credential is absent; every scan
/// request then fails with a configuration error, which is the
/// caller-visible contract for a missing credential.
#[derive(Clone)]
struct AppState {
    providers: Option<Arc<Providers>>,
    extraction: ExtractionConfig,
}

struct Providers {
    recognizer: Box<dyn TextRecognizer>,
    extractor: Box<dyn StructuredExtractor>,
}

enum AppError {
    Config(String),
    Scan(RcptError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::Config(msg) => msg,
            AppError::Scan(e) => e.to_string(),
        };
        error!("scan request failed: {message}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ScanFailure::new(message)),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanRequest {
    /// Base64-encoded image bytes.
    image_data: String,

    /// Declared image MIME type (informational).
    #[serde(default)]
    mime_type: Option<String>,
}

async fn handle_scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanOutcome>, AppError> {
    let providers = state
        .providers
        .as_ref()
        .ok_or_else(|| AppError::Config(format!("{API_KEY_VAR} is not configured")))?;

    info!(
        mime_type = request.mime_type.as_deref().unwrap_or("unspecified"),
        "starting receipt scan"
    );

    let outcome = scan_receipt(
        providers.recognizer.as_ref(),
        providers.extractor.as_ref(),
        &request.image_data,
        &state.extraction,
    )
    .await
    .map_err(AppError::Scan)?;

    if outcome.fallback.is_some() {
        warn!("structured extraction degraded to heuristic fallback");
    }

    Ok(Json(outcome))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/scan-receipt", post(handle_scan))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_state(config: &RcptConfig) -> anyhow::Result<AppState> {
    let providers = match google_api_key() {
        Ok(key) => Some(Arc::new(Providers {
            recognizer: Box::new(VisionClient::new(config.vision.clone(), key.clone())?),
            extractor: Box::new(GeminiExtractor::new(config.gemini.clone(), key)?),
        })),
        Err(_) => {
            warn!("{API_KEY_VAR} is not set; scan requests will be rejected");
            None
        }
    };

    Ok(AppState {
        providers,
        extraction: config.extraction.clone(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = if let Some(path) = cli.config.as_deref() {
        RcptConfig::from_file(std::path::Path::new(path))?
    } else {
        RcptConfig::default()
    };

    let state = build_state(&config)?;
    let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("listening on {bind}");

    axum::serve(listener, app(state)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use rcpt_core::{ExtractionError, OcrError, ReceiptCandidate, SCAN_FAILURE_ADVISORY};

    struct FixedRecognizer(&'static str);

    #[async_trait]
    impl TextRecognizer for FixedRecognizer {
        async fn recognize(&self, _: &str) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    struct BlindRecognizer;

    #[async_trait]
    impl TextRecognizer for BlindRecognizer {
        async fn recognize(&self, _: &str) -> Result<String, OcrError> {
            Err(OcrError::NoTextDetected)
        }
    }

    struct UnavailableExtractor;

    #[async_trait]
    impl StructuredExtractor for UnavailableExtractor {
        async fn extract(&self, _: &str) -> Result<ReceiptCandidate, ExtractionError> {
            Err(ExtractionError::ServiceUnavailable(503))
        }
    }

    struct HealthyExtractor;

    #[async_trait]
    impl StructuredExtractor for HealthyExtractor {
        async fn extract(&self, _: &str) -> Result<ReceiptCandidate, ExtractionError> {
            Ok(serde_json::from_str(
                r#"{"storeName":"Metro","date":"2024-03-01","subtotal":10,"taxes":1.3,"total":11.3,"items":[],"confidence":0.9}"#,
            )
            .unwrap())
        }
    }

    fn state_with(
        recognizer: impl TextRecognizer + 'static,
        extractor: impl StructuredExtractor + 'static,
    ) -> AppState {
        AppState {
            providers: Some(Arc::new(Providers {
                recognizer: Box::new(recognizer),
                extractor: Box::new(extractor),
            })),
            extraction: ExtractionConfig::default(),
        }
    }

    fn scan_request() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/scan-receipt")
            .header("content-type", "application/json")
            .header("origin", "http://localhost:3000")
            .body(Body::from(
                r#"{"imageData":"aGVsbG8=","mimeType":"image/jpeg"}"#,
            ))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn successful_scan_returns_the_envelope() {
        let state = state_with(FixedRecognizer("METRO\nTOTAL 11.30"), HealthyExtractor);
        let response = app(state).oneshot(scan_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["receiptData"]["storeName"], "Metro");
        assert_eq!(json["extractedText"], "METRO\nTOTAL 11.30");
        assert!(json.get("fallback").is_none());
    }

    #[tokio::test]
    async fn degraded_scan_carries_the_fallback_flag() {
        let state = state_with(
            FixedRecognizer("SuperMart\nBananas 2.50\nTOTAL 12.00"),
            UnavailableExtractor,
        );
        let response = app(state).oneshot(scan_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["fallback"], true);
        assert_eq!(json["receiptData"]["storeName"], "SuperMart");
        assert_eq!(json["receiptData"]["total"], 12.0);
    }

    #[tokio::test]
    async fn responses_carry_permissive_cors_headers() {
        let state = state_with(FixedRecognizer("METRO"), HealthyExtractor);
        let response = app(state).oneshot(scan_request()).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn missing_credential_is_a_server_error_with_advisory() {
        let state = AppState {
            providers: None,
            extraction: ExtractionConfig::default(),
        };
        let response = app(state).oneshot(scan_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["details"], SCAN_FAILURE_ADVISORY);
        assert!(json["error"].as_str().unwrap().contains(API_KEY_VAR));
    }

    #[tokio::test]
    async fn undetected_text_is_a_server_error() {
        let state = state_with(BlindRecognizer, HealthyExtractor);
        let response = app(state).oneshot(scan_request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("no text detected"));
        assert_eq!(json["details"], SCAN_FAILURE_ADVISORY);
    }
}
