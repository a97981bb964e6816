//! Markdown summary generation
//!
//! This module writes a human-readable markdown report of a finished crawl:
//! run information, findings grouped by page, failed pages and the full list
//! of analyzed pages.

use crate::output::traits::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown summary of a crawl to `output_path`
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Plainsight Mixed-Content Report\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", summary.seed));
    md.push_str(&format!(
        "- **Started**: {}\n",
        summary.started_at.to_rfc3339()
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        summary.duration.as_secs_f64()
    ));
    md.push_str(&format!("- **Finished because**: {}\n\n", summary.reason));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Analyzed**: {}\n", summary.pages.len()));
    md.push_str(&format!(
        "- **Pages With Findings**: {}\n",
        summary.findings_by_page().len()
    ));
    md.push_str(&format!("- **Findings**: {}\n", summary.findings.len()));
    md.push_str(&format!(
        "- **Distinct Insecure Resources**: {}\n",
        summary.distinct_resources().len()
    ));
    md.push_str(&format!(
        "- **Failed Pages**: {}\n\n",
        summary.failures.len()
    ));

    // Findings
    let grouped = summary.findings_by_page();
    if grouped.is_empty() {
        md.push_str("## Insecure Resources\n\nNone found.\n\n");
    } else {
        md.push_str("## Insecure Resources\n\n");
        md.push_str("| Page | Resource |\n");
        md.push_str("|------|----------|\n");
        for (page, resources) in &grouped {
            for resource in resources {
                md.push_str(&format!("| {} | {} |\n", page, resource));
            }
        }
        md.push('\n');
    }

    // Failures
    if !summary.failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| Page | Error |\n");
        md.push_str("|------|-------|\n");
        for (page, error) in &summary.failures {
            md.push_str(&format!("| {} | {} |\n", page, error));
        }
        md.push('\n');
    }

    // Analyzed pages
    md.push_str("## Analyzed Pages\n\n");
    for page in &summary.pages {
        md.push_str(&format!("- {}\n", page));
    }
    md.push('\n');

    md
}
