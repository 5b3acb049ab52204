// Overall 0-100 site score

use crate::model::{
    AggregateStats, CheckStatus, ScoreBreakdown, SiteWideIssues, TechnicalAnalysis,
};
use seoscope_scanner::{RobotsResult, SitemapResult};

/// Up to 40 points: the average page score scaled by 0.4.
pub fn page_contribution(stats: &AggregateStats) -> f64 {
    stats.average_page_score * 0.4
}

/// Up to 25 points from HTTPS, canonical, structured data and meta robots adoption.
pub fn technical_contribution(technical: &TechnicalAnalysis) -> u32 {
    let mut points = 0;

    if technical.https_usage >= 100.0 {
        points += 8;
    } else if technical.https_usage >= 80.0 {
        points += 5;
    }

    if technical.canonical_usage >= 80.0 {
        points += 6;
    } else if technical.canonical_usage >= 50.0 {
        points += 3;
    }

    if technical.structured_data_usage >= 50.0 {
        points += 6;
    } else if technical.structured_data_usage >= 20.0 {
        points += 3;
    }

    if technical.meta_robots_usage >= 80.0 {
        points += 5;
    } else if technical.meta_robots_usage >= 50.0 {
        points += 2;
    }

    points
}

/// Up to 20 points: 10 for duplicate content, 10 for crawl coverage.
pub fn site_wide_contribution(issues: &SiteWideIssues) -> u32 {
    let duplicates = match issues.duplicate_content_issues {
        0 => 10,
        1..=2 => 6,
        3..=5 => 3,
        _ => 0,
    };

    let coverage = if issues.crawl_coverage >= 95.0 {
        10
    } else if issues.crawl_coverage >= 80.0 {
        6
    } else if issues.crawl_coverage >= 60.0 {
        3
    } else {
        0
    };

    duplicates + coverage
}

/// Up to 15 points: 8 for robots.txt, 7 for the sitemap.
pub fn infrastructure_contribution(robots: &RobotsResult, sitemap: &SitemapResult) -> u32 {
    let robots_points = match robots.status {
        CheckStatus::Good => 8,
        CheckStatus::Warning => 4,
        CheckStatus::Error => 0,
    };
    let sitemap_points = match sitemap.status {
        CheckStatus::Good => 7,
        CheckStatus::Warning => 3,
        CheckStatus::Error => 0,
    };
    robots_points + sitemap_points
}

pub fn score(
    stats: &AggregateStats,
    technical: &TechnicalAnalysis,
    issues: &SiteWideIssues,
    robots: &RobotsResult,
    sitemap: &SitemapResult,
) -> ScoreBreakdown {
    let page = page_contribution(stats);
    let technical = technical_contribution(technical);
    let site_wide = site_wide_contribution(issues);
    let infrastructure = infrastructure_contribution(robots, sitemap);

    let raw = page + f64::from(technical + site_wide + infrastructure);
    let total = raw.round().clamp(0.0, 100.0) as u8;

    ScoreBreakdown {
        page: (page * 100.0).round() / 100.0,
        technical,
        site_wide,
        infrastructure,
        total,
    }
}
