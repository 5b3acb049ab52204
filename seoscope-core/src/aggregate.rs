// Cross-page duplicate detection and site-level statistics

use crate::model::{AggregateStats, SiteWideIssues, TechnicalAnalysis};
use crate::page::PageRecord;
use std::collections::{BTreeMap, HashSet};

/// crawled / (crawled + failed) * 100, rounded to two decimals. 0 when nothing was attempted.
pub fn crawl_coverage(crawled: usize, failed: usize) -> f64 {
    let attempted = crawled + failed;
    if attempted == 0 {
        return 0.0;
    }
    round2(crawled as f64 / attempted as f64 * 100.0)
}

/// Duplicate titles, meta descriptions and H1s across `pages`, plus coverage.
pub fn aggregate(pages: &[PageRecord], crawled: usize, failed: usize) -> SiteWideIssues {
    let duplicate_titles = duplicates(pages, |page| {
        page.title.text.iter().cloned().collect()
    });
    let duplicate_meta_descriptions = duplicates(pages, |page| {
        page.meta_description.text.iter().cloned().collect()
    });
    let duplicate_h1_tags = duplicates(pages, |page| {
        page.headings
            .h1
            .iter()
            .filter(|h| !h.is_empty())
            .cloned()
            .collect()
    });

    let duplicate_content_issues =
        duplicate_titles.len() + duplicate_meta_descriptions.len() + duplicate_h1_tags.len();

    SiteWideIssues {
        duplicate_titles,
        duplicate_meta_descriptions,
        duplicate_h1_tags,
        duplicate_content_issues,
        crawl_coverage: crawl_coverage(crawled, failed),
    }
}

/// Group page URLs by each key `keys_of` yields; keep groups with more than one page.
fn duplicates<F>(pages: &[PageRecord], keys_of: F) -> BTreeMap<String, Vec<String>>
where
    F: Fn(&PageRecord) -> Vec<String>,
{
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for page in pages {
        let mut seen = HashSet::new();
        for key in keys_of(page) {
            if seen.insert(key.clone()) {
                groups.entry(key).or_default().push(page.url.clone());
            }
        }
    }
    groups.retain(|_, urls| urls.len() > 1);
    groups
}

pub fn aggregate_stats(pages: &[PageRecord]) -> AggregateStats {
    let mut stats = AggregateStats::default();
    if pages.is_empty() {
        return stats;
    }

    let titles: Vec<usize> = pages
        .iter()
        .filter(|p| p.title.is_present())
        .map(|p| p.title.length)
        .collect();
    let metas: Vec<usize> = pages
        .iter()
        .filter(|p| p.meta_description.is_present())
        .map(|p| p.meta_description.length)
        .collect();

    stats.average_title_length = average(titles.iter().map(|&l| l as f64));
    stats.average_meta_description_length = average(metas.iter().map(|&l| l as f64));
    stats.pages_missing_title = pages.len() - titles.len();
    stats.pages_missing_meta_description = pages.len() - metas.len();
    stats.pages_missing_h1 = pages.iter().filter(|p| p.headings.h1.is_empty()).count();
    stats.total_images = pages.iter().map(|p| p.images.total).sum();
    stats.images_missing_alt = pages.iter().map(|p| p.images.missing_alt).sum();
    stats.average_page_size = average(pages.iter().map(|p| p.performance.byte_size as f64));
    stats.average_word_count = average(pages.iter().map(|p| p.content.word_count as f64));
    stats.average_page_score = average(pages.iter().map(|p| p.page_score as f64));
    stats
}

/// Share of pages (0-100) carrying each technical signal.
pub fn technical_analysis(pages: &[PageRecord]) -> TechnicalAnalysis {
    let share = |has: fn(&PageRecord) -> bool| -> f64 {
        if pages.is_empty() {
            return 0.0;
        }
        let count = pages.iter().filter(|p| has(p)).count();
        round2(count as f64 / pages.len() as f64 * 100.0)
    };

    TechnicalAnalysis {
        https_usage: share(|p| p.technical.is_https),
        canonical_usage: share(|p| p.technical.has_canonical()),
        structured_data_usage: share(|p| p.technical.has_schema()),
        meta_robots_usage: share(|p| p.technical.has_meta_robots),
        viewport_usage: share(|p| p.technical.has_viewport),
        lang_usage: share(|p| p.technical.lang.is_some()),
        compression_usage: share(|p| p.performance.is_compressed()),
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        round2(sum / count as f64)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
