//! Scan command - extract data from a receipt image.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use rcpt_core::{
    extract_receipt, google_api_key, Extraction, FallbackExtractor, GeminiExtractor,
    TextRecognizer, VisionClient,
};

use super::output::{write_outcome, OutputFormat};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Input image file (JPEG or PNG)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Skip the structured-extraction service and use heuristics only
    #[arg(long)]
    heuristic_only: bool,

    /// Show extraction confidence
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let api_key = google_api_key()?;

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    pb.set_message("Reading image...");
    pb.set_position(10);

    let bytes = fs::read(&args.input)?;
    let image_base64 = BASE64_STANDARD.encode(bytes);

    pb.set_message("Recognizing text...");
    pb.set_position(30);

    let recognizer = VisionClient::new(config.vision.clone(), api_key.clone())?;
    let ocr_text = recognizer.recognize(&image_base64).await?;
    debug!("recognized {} characters of text", ocr_text.len());

    pb.set_message("Extracting receipt data...");
    pb.set_position(70);

    let extraction = if args.heuristic_only {
        Extraction::Degraded(FallbackExtractor::from_config(&config.extraction).extract(&ocr_text))
    } else {
        let extractor = GeminiExtractor::new(config.gemini.clone(), api_key)?;
        extract_receipt(&extractor, &ocr_text, &config.extraction).await
    };

    let outcome = extraction.into_outcome(&ocr_text);

    pb.finish_with_message("Done");

    if outcome.fallback.is_some() {
        eprintln!(
            "{} Heuristic extraction used - double-check the amounts.",
            style("!").yellow()
        );
    }

    write_outcome(&outcome, args.format, args.output.as_deref())?;

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            outcome.receipt_data.confidence * 100.0
        );
        println!(
            "{} Processing time: {:?}",
            style("ℹ").blue(),
            start.elapsed()
        );
    }

    Ok(())
}
