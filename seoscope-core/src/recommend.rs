// Threshold rules that turn audit findings into prioritized recommendations

use crate::model::{
    AggregateStats, CheckStatus, Priority, Recommendation, Severity, SiteWideIssues,
    TechnicalAnalysis,
};
use seoscope_scanner::{RobotsResult, SitemapResult};
use serde_json::json;

const CANONICAL_TARGET: f64 = 80.0;
const SCHEMA_TARGET: f64 = 50.0;
const ALT_COVERAGE_TARGET: f64 = 80.0;
const CRAWL_COVERAGE_TARGET: f64 = 90.0;

fn recommendation(
    kind: Severity,
    category: &str,
    message: String,
    priority: Priority,
    details: Option<serde_json::Value>,
) -> Recommendation {
    Recommendation {
        kind,
        category: category.to_string(),
        message,
        priority,
        details,
    }
}

pub fn check_duplicate_content(issues: &SiteWideIssues) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if issues.duplicate_content_issues > 0 {
        recommendations.push(recommendation(
            Severity::Warning,
            "Duplicate Content",
            format!(
                "Found {} duplicate title, meta description or H1 group(s) across the site",
                issues.duplicate_content_issues
            ),
            Priority::High,
            Some(json!({
                "titles": issues.duplicate_titles.len(),
                "metaDescriptions": issues.duplicate_meta_descriptions.len(),
                "h1Tags": issues.duplicate_h1_tags.len(),
            })),
        ));
    }

    recommendations
}

pub fn check_technical_adoption(technical: &TechnicalAnalysis) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if technical.https_usage < 100.0 {
        recommendations.push(recommendation(
            Severity::Error,
            "Security",
            format!(
                "Only {:.1}% of pages are served over HTTPS; serve every page over HTTPS",
                technical.https_usage
            ),
            Priority::High,
            None,
        ));
    }

    if technical.canonical_usage < CANONICAL_TARGET {
        recommendations.push(recommendation(
            Severity::Warning,
            "Technical SEO",
            format!(
                "Canonical tags found on {:.1}% of pages; add a canonical URL to every indexable page",
                technical.canonical_usage
            ),
            Priority::Medium,
            None,
        ));
    }

    if technical.structured_data_usage < SCHEMA_TARGET {
        recommendations.push(recommendation(
            Severity::Warning,
            "Structured Data",
            format!(
                "Structured data found on {:.1}% of pages; add schema.org markup to key pages",
                technical.structured_data_usage
            ),
            Priority::Medium,
            None,
        ));
    }

    recommendations
}

pub fn check_infrastructure(robots: &RobotsResult, sitemap: &SitemapResult) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if robots.status != CheckStatus::Good {
        let message = match &robots.error {
            Some(error) => format!("robots.txt could not be read: {error}"),
            None => "robots.txt is missing or not served with status 200".to_string(),
        };
        recommendations.push(recommendation(
            Severity::Warning,
            "Robots.txt",
            message,
            Priority::Medium,
            Some(json!({ "status": robots.status.as_str(), "url": robots.url })),
        ));
    }

    if sitemap.status != CheckStatus::Good {
        let message = match &sitemap.error {
            Some(error) => format!("XML sitemap problem: {error}"),
            None => "No XML sitemap found; publish /sitemap.xml and reference it in robots.txt"
                .to_string(),
        };
        recommendations.push(recommendation(
            Severity::Warning,
            "Sitemap",
            message,
            Priority::Medium,
            Some(json!({ "status": sitemap.status.as_str() })),
        ));
    }

    recommendations
}

pub fn check_on_page(stats: &AggregateStats) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if stats.pages_missing_title > 0 {
        recommendations.push(recommendation(
            Severity::Error,
            "On-Page SEO",
            format!("{} page(s) are missing a title tag", stats.pages_missing_title),
            Priority::High,
            Some(json!({ "count": stats.pages_missing_title })),
        ));
    }

    if stats.pages_missing_meta_description > 0 {
        recommendations.push(recommendation(
            Severity::Warning,
            "On-Page SEO",
            format!(
                "{} page(s) are missing a meta description",
                stats.pages_missing_meta_description
            ),
            Priority::Medium,
            Some(json!({ "count": stats.pages_missing_meta_description })),
        ));
    }

    if stats.pages_missing_h1 > 0 {
        recommendations.push(recommendation(
            Severity::Warning,
            "On-Page SEO",
            format!("{} page(s) are missing an H1 heading", stats.pages_missing_h1),
            Priority::Medium,
            Some(json!({ "count": stats.pages_missing_h1 })),
        ));
    }

    if stats.total_images > 0 && stats.image_alt_coverage() < ALT_COVERAGE_TARGET {
        recommendations.push(recommendation(
            Severity::Warning,
            "Accessibility",
            format!(
                "{} of {} images are missing alt text",
                stats.images_missing_alt, stats.total_images
            ),
            Priority::Medium,
            Some(json!({
                "totalImages": stats.total_images,
                "missingAlt": stats.images_missing_alt,
            })),
        ));
    }

    recommendations
}

pub fn check_crawl_coverage(issues: &SiteWideIssues) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if issues.crawl_coverage < CRAWL_COVERAGE_TARGET {
        recommendations.push(recommendation(
            Severity::Error,
            "Crawlability",
            format!(
                "Only {:.1}% of discovered pages could be crawled; fix broken internal links and server errors",
                issues.crawl_coverage
            ),
            Priority::High,
            None,
        ));
    }

    recommendations
}

/// Every rule, high priority first. Rule order is kept within a priority.
pub fn recommend(
    stats: &AggregateStats,
    technical: &TechnicalAnalysis,
    issues: &SiteWideIssues,
    robots: &RobotsResult,
    sitemap: &SitemapResult,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();
    recommendations.extend(check_duplicate_content(issues));
    recommendations.extend(check_technical_adoption(technical));
    recommendations.extend(check_infrastructure(robots, sitemap));
    recommendations.extend(check_on_page(stats));
    recommendations.extend(check_crawl_coverage(issues));

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alt_rule_needs_images() {
        let stats = AggregateStats::default();
        assert!(check_on_page(&stats).is_empty());

        let stats = AggregateStats {
            total_images: 10,
            images_missing_alt: 3,
            ..Default::default()
        };
        let recs = check_on_page(&stats);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, "Accessibility");
    }

    #[test]
    fn test_full_https_is_quiet() {
        let technical = TechnicalAnalysis {
            https_usage: 100.0,
            canonical_usage: 100.0,
            structured_data_usage: 100.0,
            ..Default::default()
        };
        assert!(check_technical_adoption(&technical).is_empty());
    }

    #[test]
    fn test_crawl_coverage_threshold() {
        let mut issues = SiteWideIssues {
            crawl_coverage: 90.0,
            ..Default::default()
        };
        assert!(check_crawl_coverage(&issues).is_empty());

        issues.crawl_coverage = 89.99;
        let recs = check_crawl_coverage(&issues);
        assert_eq!(recs[0].priority, Priority::High);
    }
}
