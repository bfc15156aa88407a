//! Report command implementation

use anyhow::{Context, Result};
use findash_core::models::Record;
use findash_core::report::{format_amount, generate_report, ReportArtifacts, ReportStatus};
use findash_core::{InsightClient, ReportConfig};

/// Run the full report and print progress milestones
///
/// A missing input file is reported and is not an error.
pub async fn cmd_report(config: &ReportConfig, client: &InsightClient) -> Result<()> {
    let status = generate_report(config, client)
        .await
        .with_context(|| format!("Failed to build report from {}", config.input.display()))?;

    match status {
        ReportStatus::InputMissing { path } => {
            println!("❌ File '{}' not found.", path.display());
        }
        ReportStatus::Completed(artifacts) => print_milestones(&artifacts),
    }

    Ok(())
}

fn print_milestones(artifacts: &ReportArtifacts) {
    println!("✅ Data Loaded ({} records)", artifacts.record_count);
    print_preview(&artifacts.preview);
    println!();

    let totals = &artifacts.summary.totals;
    println!("📊 Total Revenue: {}", format_amount(totals.revenue));
    println!("💸 Total Expenses: {}", format_amount(totals.expenses));
    println!("💰 Total Profit: {}", format_amount(totals.profit));
    println!();

    println!("🤖 AI Generated Insights:");
    println!("{}", artifacts.insights);
    println!();

    println!(
        "✅ Charts & AI Insights saved to '{}' folder.",
        artifacts.output_dir.display()
    );
    println!(
        "✅ Full Financial Report saved to '{}'",
        artifacts.workbook.display()
    );
}

fn print_preview(records: &[Record]) {
    println!(
        "   {:<10}  {:<20}  {:>14}  {:>14}  {:>14}",
        "Date", "Department", "Revenue", "Expenses", "Profit"
    );
    println!("   {}", "─".repeat(80));
    for r in records {
        println!(
            "   {:<10}  {:<20}  {:>14}  {:>14}  {:>14}",
            r.date.format("%Y-%m-%d"),
            truncate(&r.department, 20),
            format_amount(r.revenue),
            format_amount(r.expenses),
            format_amount(r.profit),
        );
    }
}

/// Shorten `s` to at most `max` characters, marking the cut with `...`
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
