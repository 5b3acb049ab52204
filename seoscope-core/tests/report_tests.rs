// Tests for report rendering and saving

use seoscope_core::report::{generate_markdown_report, generate_text_report};
use seoscope_core::{
    AuditConfig, AuditError, AuditReport, ReportFormat, audit_with_config, render_report,
    save_report,
};
use std::str::FromStr;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn audited_site() -> (MockServer, AuditReport) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                "<html><head><title>Pipes | Fittings</title></head>\
                 <body><h1>Pipes</h1></body></html>",
                "text/html",
            ),
        )
        .mount(&server)
        .await;

    let config = AuditConfig::new(5, 1).with_delay(Duration::ZERO);
    let report = audit_with_config(&server.uri(), &config).await;
    (server, report)
}

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text").unwrap(), ReportFormat::Text);
    assert_eq!(ReportFormat::from_str("Json").unwrap(), ReportFormat::Json);
    assert_eq!(ReportFormat::from_str("markdown").unwrap(), ReportFormat::Markdown);
    assert_eq!(ReportFormat::from_str("MD").unwrap(), ReportFormat::Markdown);
    assert!(ReportFormat::from_str("csv").is_err());
}

#[test]
fn test_failed_report_rendering() {
    let report = AuditReport::failed("not a url", "Validation error: bad".to_string(), 3);

    let text = generate_text_report(&report);
    assert!(text.contains("SEOSCOPE SITE AUDIT REPORT"));
    assert!(text.contains("Error: Validation error: bad"));
    assert!(!text.contains("OVERALL SCORE"));

    let md = generate_markdown_report(&report);
    assert!(md.contains("- **Status:** failed"));

    let json = render_report(&report, ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["error"], "Validation error: bad");
    assert!(value.get("crawlSummary").is_none());
}

#[tokio::test]
async fn test_text_report_sections() {
    let (server, report) = audited_site().await;
    let text = render_report(&report, ReportFormat::Text).unwrap();

    assert!(text.contains(&format!("Target:       {}/", server.uri())));
    for heading in [
        "OVERALL SCORE",
        "CRAWL SUMMARY",
        "ROBOTS.TXT & SITEMAP",
        "SITE-WIDE ANALYSIS",
        "RECOMMENDATIONS",
        "End of Report",
    ] {
        assert!(text.contains(heading), "missing {}", heading);
    }
}

#[tokio::test]
async fn test_markdown_report_escapes_pipes() {
    let (_server, report) = audited_site().await;
    let md = render_report(&report, ReportFormat::Markdown).unwrap();

    assert!(md.starts_with("# SEO Audit: "));
    assert!(md.contains("## Crawl summary"));
    assert!(md.contains("Pipes \\| Fittings"));
    assert!(md.contains("| robots.txt | warning |"));
}

#[tokio::test]
async fn test_json_report_round_trips() {
    let (_server, report) = audited_site().await;
    let json = render_report(&report, ReportFormat::Json).unwrap();
    let parsed: AuditReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.audit_id, report.audit_id);
    assert_eq!(parsed.overall_score(), report.overall_score());
}

#[tokio::test]
async fn test_save_report() {
    let (_server, report) = audited_site().await;
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("audit.md");

    let content = render_report(&report, ReportFormat::Markdown).unwrap();
    save_report(&content, &out).unwrap();

    assert_eq!(std::fs::read_to_string(&out).unwrap(), content);
}

#[test]
fn test_save_report_missing_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("no/such/dir/audit.txt");

    let err = save_report("content", &out).unwrap_err();
    assert!(matches!(err, AuditError::Io(_)));
}
