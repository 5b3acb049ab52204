use crate::page::PageRecord;
use chrono::{DateTime, Utc};
use seoscope_scanner::{RobotsResult, SitemapResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub use seoscope_scanner::CheckStatus;

/// How bad a finding is. Shared by page issues and site recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: Severity,
    pub category: String,
    pub message: String,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUrlSample {
    pub url: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    /// Every URL the crawler attempted, crawled or failed.
    pub total_pages_found: usize,
    pub successfully_crawled: usize,
    pub failed_pages: usize,
    /// Configured depth bound.
    pub crawl_depth: usize,
    pub max_depth_reached: usize,
    #[serde(rename = "failedURLsSample")]
    pub failed_urls_sample: Vec<FailedUrlSample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub average_title_length: f64,
    pub average_meta_description_length: f64,
    pub pages_missing_title: usize,
    pub pages_missing_meta_description: usize,
    pub pages_missing_h1: usize,
    pub total_images: usize,
    pub images_missing_alt: usize,
    pub average_page_size: f64,
    pub average_word_count: f64,
    pub average_page_score: f64,
}

impl AggregateStats {
    /// Share of images carrying alt text, 0-100. A site without images scores 100.
    pub fn image_alt_coverage(&self) -> f64 {
        if self.total_images == 0 {
            return 100.0;
        }
        let with_alt = self.total_images - self.images_missing_alt;
        with_alt as f64 / self.total_images as f64 * 100.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesAnalysis {
    pub total_pages: usize,
    pub pages: BTreeMap<String, PageRecord>,
    pub aggregate_stats: AggregateStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteWideIssues {
    pub duplicate_titles: BTreeMap<String, Vec<String>>,
    pub duplicate_meta_descriptions: BTreeMap<String, Vec<String>>,
    #[serde(rename = "duplicateH1Tags")]
    pub duplicate_h1_tags: BTreeMap<String, Vec<String>>,
    pub duplicate_content_issues: usize,
    /// Percentage of attempted URLs that were fetched successfully.
    pub crawl_coverage: f64,
}

/// Percentage of pages carrying each technical signal, 0-100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAnalysis {
    pub https_usage: f64,
    pub canonical_usage: f64,
    pub structured_data_usage: f64,
    pub meta_robots_usage: f64,
    pub viewport_usage: f64,
    pub lang_usage: f64,
    pub compression_usage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub page: f64,
    pub technical: u32,
    pub site_wide: u32,
    pub infrastructure: u32,
    pub total: u8,
}

/// Sections present only when the audit ran to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDetails {
    pub crawl_summary: CrawlSummary,
    pub overall_score: u8,
    pub score_breakdown: ScoreBreakdown,
    pub robots_txt: RobotsResult,
    pub sitemap: SitemapResult,
    pub pages_analysis: PagesAnalysis,
    pub site_wide_issues: SiteWideIssues,
    pub technical_analysis: TechnicalAnalysis,
    pub recommendations: Vec<Recommendation>,
    pub site_structure: BTreeMap<String, Vec<String>>,
}

/// Terminal artifact of one audit. `details` is `None` whenever `success` is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub success: bool,
    pub url: String,
    pub audit_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub details: Option<AuditDetails>,
}

impl AuditReport {
    pub fn failed(url: &str, error: String, duration_ms: u64) -> Self {
        Self {
            success: false,
            url: url.to_string(),
            audit_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            duration_ms,
            error: Some(error),
            details: None,
        }
    }

    pub fn overall_score(&self) -> Option<u8> {
        self.details.as_ref().map(|d| d.overall_score)
    }
}
