//! Extract command - run the extraction chain over recognized text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use console::style;

use rcpt_core::{
    extract_receipt, google_api_key, Extraction, FallbackExtractor, GeminiExtractor,
};

use super::output::{write_outcome, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file, or "-" for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use the heuristic extractor only (no network access)
    #[arg(long)]
    heuristic_only: bool,

    /// Show extraction confidence
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let text = if args.input == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&args.input)?
    };

    if text.trim().is_empty() {
        anyhow::bail!("Input text is empty");
    }

    let extraction = if args.heuristic_only {
        Extraction::Degraded(FallbackExtractor::from_config(&config.extraction).extract(&text))
    } else {
        let extractor = GeminiExtractor::new(config.gemini.clone(), google_api_key()?)?;
        extract_receipt(&extractor, &text, &config.extraction).await
    };

    let outcome = extraction.into_outcome(&text);

    if outcome.fallback.is_some() && !args.heuristic_only {
        eprintln!(
            "{} Structured extraction failed; heuristic fallback used.",
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
    }

    Ok(())
}
