//! Output formatting shared by the scan and extract commands.

use std::fs;
use std::path::Path;

use console::style;

use rcpt_core::ScanOutcome;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON envelope
    Json,
    /// CSV row
    Csv,
    /// Plain text summary
    Text,
}

/// Render the outcome and write it to the given path or stdout.
pub fn write_outcome(
    outcome: &ScanOutcome,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(outcome)?,
        OutputFormat::Csv => format_csv(outcome)?,
        OutputFormat::Text => format_text(outcome),
    };

    if let Some(path) = output {
        fs::write(path, &rendered)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            path.display()
        );
    } else {
        println!("{rendered}");
    }

    Ok(())
}

fn format_csv(outcome: &ScanOutcome) -> anyhow::Result<String> {
    let data = &outcome.receipt_data;
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "store_name",
        "date",
        "subtotal",
        "taxes",
        "total",
        "confidence",
        "fallback",
    ])?;

    wtr.write_record([
        data.store_name.clone(),
        data.date.to_string(),
        data.subtotal.to_string(),
        data.taxes.to_string(),
        data.total.to_string(),
        format!("{:.2}", data.confidence),
        outcome.fallback.is_some().to_string(),
    ])?;

    let bytes = wtr.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

fn format_text(outcome: &ScanOutcome) -> String {
    let data = &outcome.receipt_data;
    let mut output = String::new();

    output.push_str(&format!("Store: {}\n", data.store_name));
    output.push_str(&format!("Date:  {}\n", data.date));
    output.push('\n');

    if !data.items.is_empty() {
        output.push_str("Items:\n");
        for item in &data.items {
            output.push_str(&format!("  - {item}\n"));
        }
        output.push('\n');
    }

    output.push_str(&format!("Subtotal: {:.2}\n", data.subtotal));
    output.push_str(&format!("Taxes:    {:.2}\n", data.taxes));
    output.push_str(&format!("Total:    {:.2}\n", data.total));

    if outcome.fallback.is_some() {
        output.push_str("\nHeuristic fallback used - verify amounts against the receipt.\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcpt_core::{FallbackExtractor, ScanOutcome};

    fn sample_outcome() -> ScanOutcome {
        let text = "SuperMart\nBananas 2.50\nTOTAL 12.00";
        let data = FallbackExtractor::new().extract(text);
        ScanOutcome::new(data, true, text)
    }

    #[test]
    fn csv_row_carries_the_fallback_flag() {
        let rendered = format_csv(&sample_outcome()).unwrap();
        let mut lines = rendered.lines();

        assert_eq!(
            lines.next().unwrap(),
            "store_name,date,subtotal,taxes,total,confidence,fallback"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("SuperMart,"));
        assert!(row.ends_with(",true"));
    }

    #[test]
    fn text_summary_lists_items_and_warning() {
        let rendered = format_text(&sample_outcome());

        assert!(rendered.contains("Store: SuperMart"));
        assert!(rendered.contains("  - Bananas 2.50"));
        assert!(rendered.contains("Total:    12.00"));
        assert!(rendered.contains("Heuristic fallback used"));
    }
}
