// End-to-end audits against a mock site

use seoscope_core::model::{CheckStatus, Priority};
use seoscope_core::{
    AuditConfig, CrawlEvent, CrawlEventCallback, audit, audit_with_config, audit_with_progress,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn page(title: &str, h1: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>", href, href))
        .collect();
    format!(
        "<html lang=\"en\"><head><title>{}</title></head>\
         <body><h1>{}</h1><p>Some words about {}.</p>{}</body></html>",
        title, h1, title, anchors
    )
}

async fn mount(server: &MockServer, route: &str, status: u16, content_type: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_raw(body, content_type))
        .mount(server)
        .await;
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    mount(server, route, 200, "text/html", body).await;
}

/// Root links to three children; nothing links further.
async fn four_page_site(server: &MockServer) {
    mount_html(
        server,
        "/",
        page("Home", "Welcome", &["/about", "/blog", "/contact"]),
    )
    .await;
    mount_html(server, "/about", page("About", "About us", &["/"])).await;
    mount_html(server, "/blog", page("Blog", "Latest posts", &[])).await;
    mount_html(server, "/contact", page("Contact", "Get in touch", &[])).await;
}

fn config() -> AuditConfig {
    AuditConfig::new(10, 2).with_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_audit_small_site() {
    let server = MockServer::start().await;
    four_page_site(&server).await;
    mount(
        &server,
        "/robots.txt",
        200,
        "text/plain",
        "User-agent: *\nDisallow: /private\n".to_string(),
    )
    .await;
    let sitemap = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\
         <url><loc>{0}/</loc></url><url><loc>{0}/about</loc></url></urlset>",
        server.uri()
    );
    mount(&server, "/sitemap.xml", 200, "application/xml", sitemap).await;

    let report = audit_with_config(&server.uri(), &config()).await;
    assert!(report.success, "{:?}", report.error);
    let details = report.details.expect("details on success");

    assert_eq!(details.crawl_summary.total_pages_found, 4);
    assert_eq!(details.crawl_summary.successfully_crawled, 4);
    assert_eq!(details.crawl_summary.failed_pages, 0);
    assert_eq!(details.crawl_summary.max_depth_reached, 1);
    assert_eq!(details.site_wide_issues.crawl_coverage, 100.0);
    assert_eq!(details.pages_analysis.total_pages, 4);

    assert_eq!(details.robots_txt.status, CheckStatus::Good);
    assert_eq!(details.robots_txt.directives.disallow_patterns, vec!["/private"]);
    assert_eq!(details.sitemap.status, CheckStatus::Good);
    assert_eq!(details.sitemap.total_urls, 2);
    assert_eq!(details.score_breakdown.infrastructure, 15);

    let root = format!("{}/", server.uri());
    assert_eq!(details.site_structure[&root].len(), 3);
    assert!(details.overall_score <= 100);
    assert_eq!(details.overall_score, details.score_breakdown.total);
}

#[tokio::test]
async fn test_missing_robots_is_warning() {
    let server = MockServer::start().await;
    four_page_site(&server).await;

    let report = audit_with_config(&server.uri(), &config()).await;
    assert!(report.success);
    let details = report.details.unwrap();

    assert_eq!(details.robots_txt.status, CheckStatus::Warning);
    assert_eq!(details.robots_txt.status_code, Some(404));
    assert_eq!(details.sitemap.status, CheckStatus::Warning);
    assert_eq!(details.score_breakdown.infrastructure, 7);
    assert!(
        details
            .recommendations
            .iter()
            .any(|r| r.category == "Robots.txt")
    );
}

#[tokio::test]
async fn test_duplicate_titles_reported() {
    let server = MockServer::start().await;
    mount_html(&server, "/", page("Home", "Welcome", &["/about", "/contact"])).await;
    mount_html(&server, "/about", page("About", "About us", &[])).await;
    mount_html(&server, "/contact", page("Home", "Contact us", &[])).await;

    let report = audit_with_config(&server.uri(), &config()).await;
    let details = report.details.unwrap();
    let issues = &details.site_wide_issues;

    assert_eq!(
        issues.duplicate_titles["Home"],
        vec![format!("{}/", server.uri()), format!("{}/contact", server.uri())]
    );
    assert!(issues.duplicate_h1_tags.is_empty());
    assert_eq!(issues.duplicate_content_issues, 1);

    let first = &details.recommendations[0];
    assert_eq!(first.priority, Priority::High);
    assert!(
        details
            .recommendations
            .iter()
            .any(|r| r.category == "Duplicate Content")
    );
}

#[tokio::test]
async fn test_broken_link_lowers_coverage() {
    let server = MockServer::start().await;
    mount_html(&server, "/", page("Home", "Welcome", &["/gone", "/about"])).await;
    mount_html(&server, "/about", page("About", "About us", &[])).await;

    let report = audit_with_config(&server.uri(), &config()).await;
    let details = report.details.unwrap();
    let summary = &details.crawl_summary;

    assert_eq!(summary.total_pages_found, 3);
    assert_eq!(summary.successfully_crawled, 2);
    assert_eq!(summary.failed_pages, 1);
    assert_eq!(summary.failed_urls_sample.len(), 1);
    assert_eq!(summary.failed_urls_sample[0].url, format!("{}/gone", server.uri()));
    assert_eq!(summary.failed_urls_sample[0].reason, "HTTP status 404");
    assert_eq!(details.site_wide_issues.crawl_coverage, 66.67);
    assert!(
        details
            .recommendations
            .iter()
            .any(|r| r.category == "Crawlability")
    );
}

#[tokio::test]
async fn test_malformed_sitemap_still_succeeds() {
    let server = MockServer::start().await;
    four_page_site(&server).await;
    mount(
        &server,
        "/sitemap.xml",
        200,
        "application/xml",
        "<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"><url><loc>".to_string(),
    )
    .await;

    let report = audit_with_config(&server.uri(), &config()).await;
    assert!(report.success);
    let details = report.details.unwrap();
    assert_eq!(details.sitemap.status, CheckStatus::Error);
    assert!(details.sitemap.error.is_some());
    assert_eq!(details.crawl_summary.successfully_crawled, 4);
}

#[tokio::test]
async fn test_max_pages_bounds_audit() {
    let server = MockServer::start().await;
    four_page_site(&server).await;

    let config = AuditConfig::new(2, 3).with_delay(Duration::ZERO);
    let report = audit_with_config(&server.uri(), &config).await;
    let details = report.details.unwrap();
    assert_eq!(details.crawl_summary.successfully_crawled, 2);
    assert_eq!(details.pages_analysis.pages.len(), 2);
}

#[tokio::test]
async fn test_invalid_url_fails_without_network() {
    let report = audit("not a url", 10, 2).await;
    assert!(!report.success);
    assert!(report.error.is_some());
    assert!(report.details.is_none());
    assert_eq!(report.overall_score(), None);
}

#[tokio::test]
async fn test_unresolvable_domain_aborts_audit() {
    let config = AuditConfig::new(5, 1)
        .with_delay(Duration::ZERO)
        .with_timeout(Duration::from_secs(2));
    let report = audit_with_config("https://no-such-host.invalid/", &config).await;

    assert!(!report.success);
    assert!(report.details.is_none());
    let error = report.error.expect("error message");
    assert!(error.contains("no-such-host.invalid"), "{}", error);
}

/// An IP literal needs no resolution, so a refused connection is an ordinary
/// per-URL failure.
#[tokio::test]
async fn test_refused_connection_reports_failed_crawl() {
    let config = AuditConfig::new(5, 1)
        .with_delay(Duration::ZERO)
        .with_timeout(Duration::from_secs(2));
    let report = audit_with_config("http://127.0.0.1:9/", &config).await;

    assert!(report.success);
    let details = report.details.unwrap();
    assert_eq!(details.crawl_summary.successfully_crawled, 0);
    assert_eq!(details.crawl_summary.failed_pages, 1);
    assert_eq!(details.site_wide_issues.crawl_coverage, 0.0);
    assert_eq!(details.robots_txt.status, CheckStatus::Error);
}

#[tokio::test]
async fn test_progress_events() {
    let server = MockServer::start().await;
    four_page_site(&server).await;

    let events: Arc<Mutex<Vec<CrawlEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let callback: CrawlEventCallback = Arc::new(move |event: &CrawlEvent| {
        sink.lock().unwrap().push(event.clone());
    });

    let report = audit_with_progress(&server.uri(), &config(), Some(callback)).await;
    assert!(report.success);

    let events = events.lock().unwrap();
    assert!(matches!(
        events.last(),
        Some(CrawlEvent::Done {
            crawled: 4,
            failed: 0
        })
    ));
}

#[tokio::test]
async fn test_report_json_field_names() {
    let server = MockServer::start().await;
    four_page_site(&server).await;

    let report = audit_with_config(&server.uri(), &config()).await;
    let json = serde_json::to_value(&report).unwrap();

    for key in [
        "success",
        "auditId",
        "generatedAt",
        "crawlSummary",
        "overallScore",
        "robotsTxt",
        "sitemap",
        "pagesAnalysis",
        "siteWideIssues",
        "technicalAnalysis",
        "recommendations",
        "siteStructure",
    ] {
        assert!(json.get(key).is_some(), "missing {}", key);
    }
    assert!(json["crawlSummary"].get("failedURLsSample").is_some());
    assert!(json["sitemap"].get("totalURLs").is_some());
    assert!(json["siteWideIssues"].get("duplicateH1Tags").is_some());
    assert_eq!(json["robotsTxt"]["status"], "warning");
}
