// Audit entry points and configuration

use crate::aggregate::{aggregate, aggregate_stats, technical_analysis};
use crate::error::{AuditError, Result};
use crate::model::{AuditDetails, AuditReport, CrawlSummary, FailedUrlSample, PagesAnalysis};
use crate::page::{PageRecord, analyze_page};
use crate::recommend::recommend;
use crate::score::score;
use chrono::Utc;
use seoscope_scanner::fetcher::{DEFAULT_TIMEOUT, USER_AGENT};
use seoscope_scanner::{
    CrawlEventCallback, CrawlState, CrawlTarget, Crawler, Fetcher, analyze_robots,
    analyze_sitemap,
};
use std::time::{Duration, Instant};
use tokio::net::lookup_host;
use tracing::{debug, info, warn};
use url::{Host, Url};
use uuid::Uuid;

pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_MAX_DEPTH: usize = 3;
pub const MAX_PAGES_LIMIT: usize = 500;
pub const MAX_DEPTH_LIMIT: usize = 10;
const FAILED_URL_SAMPLE: usize = 10;

/// Knobs for one audit. Page and depth bounds are clamped on every setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    pub max_pages: usize,
    pub max_depth: usize,
    pub delay: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            max_depth: DEFAULT_MAX_DEPTH,
            delay: seoscope_scanner::crawler::DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl AuditConfig {
    pub fn new(max_pages: usize, max_depth: usize) -> Self {
        Self::default()
            .with_max_pages(max_pages)
            .with_max_depth(max_depth)
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.clamp(1, MAX_PAGES_LIMIT);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_DEPTH_LIMIT);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Parse `url` and require an http(s) scheme with a host. No network access.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim())
        .map_err(|e| AuditError::Validation(format!("invalid URL '{}': {}", url, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AuditError::Validation(format!(
            "unsupported scheme '{}', expected http or https",
            parsed.scheme()
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AuditError::Validation(format!("URL '{}' has no host", url)));
    }

    Ok(parsed)
}

/// Audit with the default configuration and the given bounds. Never fails;
/// problems are reported through `success` and `error`.
pub async fn audit(url: &str, max_pages: usize, max_depth: usize) -> AuditReport {
    audit_with_config(url, &AuditConfig::new(max_pages, max_depth)).await
}

pub async fn audit_with_config(url: &str, config: &AuditConfig) -> AuditReport {
    audit_with_progress(url, config, None).await
}

/// Like [`audit_with_config`], forwarding crawl events to `progress`.
pub async fn audit_with_progress(
    url: &str,
    config: &AuditConfig,
    progress: Option<CrawlEventCallback>,
) -> AuditReport {
    let start = Instant::now();
    match try_audit(url, config, progress).await {
        Ok(report) => report,
        Err(e) => {
            warn!("Audit of {} failed: {}", url, e);
            AuditReport::failed(url, e.to_string(), elapsed_ms(start))
        }
    }
}

/// The fallible core of an audit. Validation, resolving the root domain and
/// client set-up can fail; per-URL fetch problems end up in the crawl summary.
pub async fn try_audit(
    url: &str,
    config: &AuditConfig,
    progress: Option<CrawlEventCallback>,
) -> Result<AuditReport> {
    let start = Instant::now();
    let base = validate_url(url)?;
    let target = CrawlTarget::new(base.as_str(), config.max_pages, config.max_depth)?;
    resolve_host(&base).await?;
    let fetcher = Fetcher::with_options(config.timeout, &config.user_agent)?;

    info!(
        "Auditing {} (max pages {}, max depth {})",
        target.base_url, target.max_pages, target.max_depth
    );

    let mut crawler = Crawler::new(fetcher.clone()).with_delay(config.delay);
    if let Some(callback) = progress {
        crawler = crawler.with_event_callback(callback);
    }

    let infrastructure = async {
        let robots = analyze_robots(&fetcher, &base).await;
        let sitemap = analyze_sitemap(&fetcher, &base, &robots.directives.sitemaps).await;
        (robots, sitemap)
    };
    let (state, (robots, sitemap)) = tokio::join!(crawler.crawl(&target), infrastructure);

    info!(
        "robots.txt: {}, sitemap: {}",
        robots.status.as_str(),
        sitemap.status.as_str()
    );

    let records: Vec<PageRecord> = state.pages.iter().map(analyze_page).collect();
    let crawl_summary = summarize(&state, target.max_depth);
    let site_wide_issues = aggregate(&records, state.crawled_count(), state.failed_count());
    let stats = aggregate_stats(&records);
    let technical = technical_analysis(&records);
    let breakdown = score(&stats, &technical, &site_wide_issues, &robots, &sitemap);
    let recommendations = recommend(&stats, &technical, &site_wide_issues, &robots, &sitemap);

    info!(
        "Audit of {} complete: score {}, {} pages, {} recommendations",
        target.base_url,
        breakdown.total,
        records.len(),
        recommendations.len()
    );

    let pages_analysis = PagesAnalysis {
        total_pages: records.len(),
        pages: records
            .into_iter()
            .map(|record| (record.url.clone(), record))
            .collect(),
        aggregate_stats: stats,
    };

    Ok(AuditReport {
        success: true,
        url: target.base_url.clone(),
        audit_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        duration_ms: elapsed_ms(start),
        error: None,
        details: Some(AuditDetails {
            crawl_summary,
            overall_score: breakdown.total,
            score_breakdown: breakdown,
            robots_txt: robots,
            sitemap,
            pages_analysis,
            site_wide_issues,
            technical_analysis: technical,
            recommendations,
            site_structure: state.site_structure,
        }),
    })
}

/// Resolve the target's domain. A root that cannot be resolved aborts the audit;
/// IP literals are taken as they are.
async fn resolve_host(base: &Url) -> Result<()> {
    let Some(Host::Domain(domain)) = base.host() else {
        return Ok(());
    };
    let port = base.port_or_known_default().unwrap_or(80);

    let mut addrs = lookup_host((domain, port))
        .await
        .map_err(|e| AuditError::Resolve(format!("{}: {}", domain, e)))?;
    if addrs.next().is_none() {
        return Err(AuditError::Resolve(format!("{}: no addresses", domain)));
    }
    debug!("Resolved {}", domain);
    Ok(())
}

fn summarize(state: &CrawlState, max_depth: usize) -> CrawlSummary {
    let max_depth_reached = state
        .pages
        .iter()
        .map(|p| p.depth)
        .chain(state.failures.iter().map(|f| f.depth))
        .max()
        .unwrap_or(0);

    CrawlSummary {
        total_pages_found: state.crawled_count() + state.failed_count(),
        successfully_crawled: state.crawled_count(),
        failed_pages: state.failed_count(),
        crawl_depth: max_depth,
        max_depth_reached,
        failed_urls_sample: state
            .failures
            .iter()
            .take(FAILED_URL_SAMPLE)
            .map(|f| FailedUrlSample {
                url: f.url.clone(),
                reason: f.reason.clone(),
            })
            .collect(),
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_clamps_bounds() {
        let config = AuditConfig::new(0, 50);
        assert_eq!(config.max_pages, 1);
        assert_eq!(config.max_depth, MAX_DEPTH_LIMIT);

        let config = AuditConfig::default().with_max_pages(10_000);
        assert_eq!(config.max_pages, MAX_PAGES_LIMIT);
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("  http://example.com/a  ").is_ok());
        assert!(matches!(
            validate_url("not a url"),
            Err(AuditError::Validation(_))
        ));
        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(AuditError::Validation(_))
        ));
        assert!(matches!(
            validate_url("mailto:someone@example.com"),
            Err(AuditError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_report() {
        let report = audit("not a url", 5, 1).await;
        assert!(!report.success);
        assert!(report.details.is_none());
        assert!(report.error.unwrap().contains("invalid URL"));
    }
}
