// Overall score composition

use seoscope_core::model::{AggregateStats, CheckStatus, SiteWideIssues, TechnicalAnalysis};
use seoscope_core::recommend::recommend;
use seoscope_core::score::{infrastructure_contribution, score};
use seoscope_scanner::robots::RobotsDirectives;
use seoscope_scanner::{RobotsResult, SitemapResult};

fn robots(status: CheckStatus) -> RobotsResult {
    RobotsResult {
        exists: status == CheckStatus::Good,
        accessible: status != CheckStatus::Error,
        status,
        url: "https://example.com/robots.txt".to_string(),
        status_code: None,
        directives: RobotsDirectives::default(),
        raw_size: 0,
        error: None,
    }
}

fn sitemap(status: CheckStatus) -> SitemapResult {
    SitemapResult {
        exists: status == CheckStatus::Good,
        accessible: status != CheckStatus::Error,
        status,
        url: None,
        is_index: false,
        total_urls: 0,
        urls: Vec::new(),
        child_sitemaps: Vec::new(),
        error: None,
    }
}

fn perfect_site() -> (AggregateStats, TechnicalAnalysis, SiteWideIssues) {
    let stats = AggregateStats {
        average_page_score: 100.0,
        ..Default::default()
    };
    let technical = TechnicalAnalysis {
        https_usage: 100.0,
        canonical_usage: 100.0,
        structured_data_usage: 100.0,
        meta_robots_usage: 100.0,
        ..Default::default()
    };
    let issues = SiteWideIssues {
        crawl_coverage: 100.0,
        ..Default::default()
    };
    (stats, technical, issues)
}

#[test]
fn test_infrastructure_points() {
    assert_eq!(
        infrastructure_contribution(&robots(CheckStatus::Good), &sitemap(CheckStatus::Good)),
        15
    );
    assert_eq!(
        infrastructure_contribution(&robots(CheckStatus::Warning), &sitemap(CheckStatus::Warning)),
        7
    );
    assert_eq!(
        infrastructure_contribution(&robots(CheckStatus::Error), &sitemap(CheckStatus::Error)),
        0
    );
}

#[test]
fn test_perfect_site_scores_100() {
    let (stats, technical, issues) = perfect_site();
    let breakdown = score(
        &stats,
        &technical,
        &issues,
        &robots(CheckStatus::Good),
        &sitemap(CheckStatus::Good),
    );
    assert_eq!(breakdown.page, 40.0);
    assert_eq!(breakdown.technical, 25);
    assert_eq!(breakdown.site_wide, 20);
    assert_eq!(breakdown.infrastructure, 15);
    assert_eq!(breakdown.total, 100);

    let recs = recommend(
        &stats,
        &technical,
        &issues,
        &robots(CheckStatus::Good),
        &sitemap(CheckStatus::Good),
    );
    assert!(recs.is_empty());
}

#[test]
fn test_empty_crawl_scores_infrastructure_only() {
    let breakdown = score(
        &AggregateStats::default(),
        &TechnicalAnalysis::default(),
        &SiteWideIssues::default(),
        &robots(CheckStatus::Warning),
        &sitemap(CheckStatus::Warning),
    );
    // No duplicates still earns the duplicate points
    assert_eq!(breakdown.site_wide, 10);
    assert_eq!(breakdown.total, 17);
}

#[test]
fn test_recommendations_high_priority_first() {
    let (stats, _, mut issues) = perfect_site();
    issues.crawl_coverage = 50.0;
    let recs = recommend(
        &stats,
        &TechnicalAnalysis {
            https_usage: 100.0,
            canonical_usage: 10.0,
            structured_data_usage: 100.0,
            ..Default::default()
        },
        &issues,
        &robots(CheckStatus::Warning),
        &sitemap(CheckStatus::Good),
    );

    let categories: Vec<&str> = recs.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(categories, vec!["Crawlability", "Technical SEO", "Robots.txt"]);
}
