// Site-wide aggregation, technical adoption and recommendation rules over analyzed pages

use seoscope_core::aggregate::{aggregate, aggregate_stats, technical_analysis};
use seoscope_core::model::{Priority, Severity};
use seoscope_core::page::{PageRecord, analyze_page};
use seoscope_core::recommend::{check_on_page, check_technical_adoption};
use seoscope_scanner::{CrawledPage, FetchedPage};

fn analyzed(url: &str, html: &str) -> PageRecord {
    let mut response = FetchedPage::new(url.to_string());
    response.status_code = 200;
    response.content_type = Some("text/html".to_string());
    response.body = html.to_string();
    response.byte_size = html.len() as u64;
    analyze_page(&CrawledPage {
        url: url.to_string(),
        depth: 0,
        response,
    })
}

#[test]
fn test_duplicates_group_in_crawl_order() {
    let pages = vec![
        analyzed(
            "https://example.com/",
            "<title>Shop</title><meta name=\"description\" content=\"Buy things\"><h1>Shop</h1>",
        ),
        analyzed(
            "https://example.com/a",
            "<title>Unique</title><meta name=\"description\" content=\"Buy things\"><h1>Shop</h1>",
        ),
        analyzed(
            "https://example.com/b",
            "<title>Shop</title><h1>Other</h1><h1>Shop</h1>",
        ),
    ];

    let issues = aggregate(&pages, 3, 0);
    assert_eq!(
        issues.duplicate_titles["Shop"],
        vec!["https://example.com/", "https://example.com/b"]
    );
    assert_eq!(
        issues.duplicate_meta_descriptions["Buy things"],
        vec!["https://example.com/", "https://example.com/a"]
    );
    assert_eq!(issues.duplicate_h1_tags["Shop"].len(), 3);
    assert!(!issues.duplicate_h1_tags.contains_key("Other"));
    assert_eq!(issues.duplicate_content_issues, 3);
    assert_eq!(issues.crawl_coverage, 100.0);
}

#[test]
fn test_missing_titles_are_not_duplicates() {
    let pages = vec![
        analyzed("https://example.com/", "<p>no title</p>"),
        analyzed("https://example.com/a", "<title>   </title>"),
    ];
    let issues = aggregate(&pages, 2, 0);
    assert!(issues.duplicate_titles.is_empty());
    assert_eq!(issues.duplicate_content_issues, 0);

    let stats = aggregate_stats(&pages);
    assert_eq!(stats.pages_missing_title, 2);
    assert_eq!(stats.pages_missing_h1, 2);
}

#[test]
fn test_aggregate_stats_images() {
    let pages = vec![
        analyzed(
            "https://example.com/",
            "<title>Home</title><img src=\"a.png\" alt=\"A\"><img src=\"b.png\">",
        ),
        analyzed(
            "https://example.com/a",
            "<title>About page</title><img src=\"c.png\" alt=\"\">",
        ),
    ];

    let stats = aggregate_stats(&pages);
    assert_eq!(stats.total_images, 3);
    assert_eq!(stats.images_missing_alt, 2);
    assert_eq!(stats.average_title_length, 7.0);
    assert!(stats.image_alt_coverage() < 80.0);

    let recs = check_on_page(&stats);
    assert!(recs.iter().any(|r| r.category == "Accessibility"));
    assert!(recs.iter().any(|r| r.message.contains("meta description")));
}

#[test]
fn test_technical_percentages() {
    let pages = vec![
        analyzed(
            "https://example.com/",
            "<html lang=\"en\"><head><link rel=\"canonical\" href=\"https://example.com/\">\
             <meta name=\"viewport\" content=\"width=device-width\">\
             <meta name=\"robots\" content=\"index,follow\"></head></html>",
        ),
        analyzed("http://example.com/a", "<html><head></head></html>"),
    ];

    let technical = technical_analysis(&pages);
    assert_eq!(technical.https_usage, 50.0);
    assert_eq!(technical.canonical_usage, 50.0);
    assert_eq!(technical.meta_robots_usage, 50.0);
    assert_eq!(technical.viewport_usage, 50.0);
    assert_eq!(technical.lang_usage, 50.0);
    assert_eq!(technical.structured_data_usage, 0.0);

    let recs = check_technical_adoption(&technical);
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].kind, Severity::Error);
    assert_eq!(recs[0].priority, Priority::High);
}
