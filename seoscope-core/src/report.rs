use crate::error::{AuditError, Result};
use crate::model::{AuditDetails, AuditReport, CheckStatus, Priority, Recommendation};
use colored::{ColoredString, Colorize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";
const THIN_RULE: &str = "────────────────────────────────────────────────────────────────────────────────";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl FromStr for ReportFormat {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            other => Err(AuditError::Validation(format!(
                "unknown report format '{}', expected text, json or markdown",
                other
            ))),
        }
    }
}

pub fn render_report(report: &AuditReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(report)),
        ReportFormat::Json => Ok(generate_json_report(report)?),
        ReportFormat::Markdown => Ok(generate_markdown_report(report)),
    }
}

pub fn generate_json_report(report: &AuditReport) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn generate_text_report(report: &AuditReport) -> String {
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str("                           SEOSCOPE SITE AUDIT REPORT\n");
    out.push_str(RULE);
    out.push_str("\n\n");

    out.push_str(&format!("Target:       {}\n", report.url));
    out.push_str(&format!("Audit ID:     {}\n", report.audit_id));
    out.push_str(&format!(
        "Generated:    {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!("Duration:     {} ms\n", report.duration_ms));

    let details = match (&report.details, &report.error) {
        (Some(details), _) => details,
        (None, error) => {
            out.push_str(&format!("Status:       {}\n\n", "FAILED".red().bold()));
            if let Some(error) = error {
                out.push_str(&format!("Error: {}\n", error));
            }
            return out;
        }
    };
    out.push_str(&format!("Status:       {}\n\n", "COMPLETED".green().bold()));

    section(&mut out, "OVERALL SCORE");
    out.push_str(&format!(
        "Overall Score: {} / 100\n\n",
        colored_score(details.overall_score)
    ));
    let breakdown = &details.score_breakdown;
    out.push_str(&format!("  Page quality     {:>6.2} / 40\n", breakdown.page));
    out.push_str(&format!("  Technical        {:>6} / 25\n", breakdown.technical));
    out.push_str(&format!("  Site-wide        {:>6} / 20\n", breakdown.site_wide));
    out.push_str(&format!("  Infrastructure   {:>6} / 15\n\n", breakdown.infrastructure));

    text_crawl_section(&mut out, details);
    text_infrastructure_section(&mut out, details);
    text_site_wide_section(&mut out, details);

    section(&mut out, "PAGES");
    for page in details.pages_analysis.pages.values() {
        out.push_str(&format!(
            "  {:>3}  {}  (depth {}, {} ms)\n",
            colored_score(page.page_score),
            page.url,
            page.depth,
            page.performance.load_time_ms
        ));
    }
    out.push('\n');

    section(&mut out, "RECOMMENDATIONS");
    if details.recommendations.is_empty() {
        out.push_str("No recommendations. Nice work.\n\n");
    }
    for (idx, rec) in details.recommendations.iter().enumerate() {
        out.push_str(&format!(
            "[{}] {} {}\n",
            idx + 1,
            colored_priority(rec),
            rec.category.bold()
        ));
        out.push_str(&format!("    {}\n", rec.message));
        out.push_str(THIN_RULE);
        out.push('\n');
    }

    out.push('\n');
    out.push_str(RULE);
    out.push_str("\n                                 End of Report\n");
    out.push_str(RULE);
    out.push('\n');
    out
}

fn section(out: &mut String, title: &str) {
    out.push_str(RULE);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(RULE);
    out.push_str("\n\n");
}

fn text_crawl_section(out: &mut String, details: &AuditDetails) {
    let summary = &details.crawl_summary;
    section(out, "CRAWL SUMMARY");
    out.push_str(&format!("Pages Found:       {}\n", summary.total_pages_found));
    out.push_str(&format!("Crawled:           {}\n", summary.successfully_crawled));
    out.push_str(&format!("Failed:            {}\n", summary.failed_pages));
    out.push_str(&format!(
        "Depth:             {} (limit {})\n",
        summary.max_depth_reached, summary.crawl_depth
    ));
    out.push_str(&format!(
        "Coverage:          {:.2}%\n",
        details.site_wide_issues.crawl_coverage
    ));
    for failed in &summary.failed_urls_sample {
        out.push_str(&format!("  {} {} ({})\n", "✗".red(), failed.url, failed.reason));
    }
    out.push('\n');
}

fn text_infrastructure_section(out: &mut String, details: &AuditDetails) {
    section(out, "ROBOTS.TXT & SITEMAP");
    let robots = &details.robots_txt;
    out.push_str(&format!(
        "robots.txt:   {}  {}\n",
        colored_status(robots.status),
        robots.url
    ));
    if robots.exists {
        out.push_str(&format!(
            "  {} disallow, {} allow, {} sitemap(s)\n",
            robots.directives.disallow_patterns.len(),
            robots.directives.allow_patterns.len(),
            robots.directives.sitemaps.len()
        ));
    }

    let sitemap = &details.sitemap;
    out.push_str(&format!(
        "sitemap:      {}  {}\n",
        colored_status(sitemap.status),
        sitemap.url.as_deref().unwrap_or("not found")
    ));
    if sitemap.exists {
        let kind = if sitemap.is_index { "index" } else { "urlset" };
        out.push_str(&format!("  {} with {} URL(s)\n", kind, sitemap.total_urls));
    }
    if let Some(ref error) = sitemap.error {
        out.push_str(&format!("  {}\n", error));
    }
    out.push('\n');
}

fn text_site_wide_section(out: &mut String, details: &AuditDetails) {
    let issues = &details.site_wide_issues;
    let technical = &details.technical_analysis;
    let stats = &details.pages_analysis.aggregate_stats;

    section(out, "SITE-WIDE ANALYSIS");
    out.push_str(&format!("Average page score:      {:.2}\n", stats.average_page_score));
    out.push_str(&format!("Missing titles:          {}\n", stats.pages_missing_title));
    out.push_str(&format!(
        "Missing descriptions:    {}\n",
        stats.pages_missing_meta_description
    ));
    out.push_str(&format!("Missing H1:              {}\n", stats.pages_missing_h1));
    out.push_str(&format!(
        "Images missing alt:      {} of {}\n",
        stats.images_missing_alt, stats.total_images
    ));
    out.push_str(&format!("HTTPS:                   {:.1}%\n", technical.https_usage));
    out.push_str(&format!("Canonical:               {:.1}%\n", technical.canonical_usage));
    out.push_str(&format!(
        "Structured data:         {:.1}%\n",
        technical.structured_data_usage
    ));
    out.push_str(&format!("Meta robots:             {:.1}%\n", technical.meta_robots_usage));
    out.push_str(&format!(
        "Duplicate groups:        {}\n",
        issues.duplicate_content_issues
    ));

    for (label, groups) in [
        ("title", &issues.duplicate_titles),
        ("description", &issues.duplicate_meta_descriptions),
        ("h1", &issues.duplicate_h1_tags),
    ] {
        for (value, urls) in groups {
            out.push_str(&format!("  duplicate {} \"{}\": {} pages\n", label, value, urls.len()));
        }
    }
    out.push('\n');
}

fn colored_score(score: u8) -> ColoredString {
    let text = score.to_string();
    match score {
        80..=100 => text.green().bold(),
        50..=79 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

fn colored_status(status: CheckStatus) -> ColoredString {
    match status {
        CheckStatus::Good => "good".green(),
        CheckStatus::Warning => "warning".yellow(),
        CheckStatus::Error => "error".red(),
    }
}

fn colored_priority(rec: &Recommendation) -> ColoredString {
    match rec.priority {
        Priority::High => "[HIGH]  ".red().bold(),
        Priority::Medium => "[MEDIUM]".yellow(),
    }
}

pub fn generate_markdown_report(report: &AuditReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# SEO Audit: {}\n\n", report.url));
    md.push_str(&format!(
        "- **Audit ID:** `{}`\n- **Generated:** {}\n- **Duration:** {} ms\n",
        report.audit_id,
        report.generated_at.to_rfc3339(),
        report.duration_ms
    ));

    let Some(details) = &report.details else {
        md.push_str("- **Status:** failed\n\n");
        if let Some(ref error) = report.error {
            md.push_str(&format!("> {}\n", error));
        }
        return md;
    };

    md.push_str(&format!(
        "- **Overall score:** {}/100\n\n",
        details.overall_score
    ));

    let summary = &details.crawl_summary;
    md.push_str("## Crawl summary\n\n");
    md.push_str("| Metric | Value |\n|---|---|\n");
    md.push_str(&format!("| Pages found | {} |\n", summary.total_pages_found));
    md.push_str(&format!("| Crawled | {} |\n", summary.successfully_crawled));
    md.push_str(&format!("| Failed | {} |\n", summary.failed_pages));
    md.push_str(&format!(
        "| Coverage | {:.2}% |\n",
        details.site_wide_issues.crawl_coverage
    ));
    md.push_str(&format!(
        "| robots.txt | {} |\n| sitemap | {} |\n\n",
        details.robots_txt.status.as_str(),
        details.sitemap.status.as_str()
    ));

    md.push_str("## Pages\n\n| URL | Score | Title | Words |\n|---|---|---|---|\n");
    for page in details.pages_analysis.pages.values() {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            page.url,
            page.page_score,
            escape_cell(page.title.text.as_deref().unwrap_or("")),
            page.content.word_count
        ));
    }
    md.push('\n');

    md.push_str("## Recommendations\n\n");
    if details.recommendations.is_empty() {
        md.push_str("None.\n");
    }
    for rec in &details.recommendations {
        md.push_str(&format!(
            "- **[{}] {}:** {}\n",
            rec.priority.as_str(),
            rec.category,
            rec.message
        ));
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

pub fn save_report(content: &str, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_cell() {
        assert_eq!(escape_cell("a | b"), "a \\| b");
    }
}
