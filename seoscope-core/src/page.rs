// Per-page on-page SEO signals and page score

use crate::model::{CheckStatus, Severity};
use scraper::{ElementRef, Html, Selector};
use seoscope_scanner::CrawledPage;
use seoscope_scanner::links::extract_links;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use url::Url;

pub const TITLE_OPTIMAL: RangeInclusive<usize> = 30..=60;
pub const META_DESCRIPTION_OPTIMAL: RangeInclusive<usize> = 120..=160;
pub const WORDS_PER_MINUTE: usize = 200;
pub const MIN_CONTENT_WORDS: usize = 300;
pub const TOP_KEYWORDS: usize = 10;
pub const SLOW_LOAD_MS: u64 = 3000;
pub const VERY_SLOW_LOAD_MS: u64 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthStatus {
    Optimal,
    Warning,
    Error,
}

/// A text element whose length is judged against an optimal range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSignal {
    pub text: Option<String>,
    pub length: usize,
    pub status: LengthStatus,
}

impl TextSignal {
    fn measure(text: Option<String>, optimal: RangeInclusive<usize>) -> Self {
        let length = text.as_ref().map(|t| t.chars().count()).unwrap_or(0);
        let status = match text {
            None => LengthStatus::Error,
            Some(_) if optimal.contains(&length) => LengthStatus::Optimal,
            Some(_) => LengthStatus::Warning,
        };
        Self {
            text,
            length,
            status,
        }
    }

    pub fn is_present(&self) -> bool {
        self.text.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingStats {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
    pub h1_status: CheckStatus,
    /// e.g. "H1 -> H3", one per skipped level in document order.
    pub hierarchy_skips: Vec<String>,
}

impl HeadingStats {
    pub fn level(&self, level: u8) -> &[String] {
        match level {
            1 => &self.h1,
            2 => &self.h2,
            3 => &self.h3,
            4 => &self.h4,
            5 => &self.h5,
            6 => &self.h6,
            _ => &[],
        }
    }

    pub fn count(&self, level: u8) -> usize {
        self.level(level).len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordDensity {
    pub word: String,
    pub count: usize,
    /// Percent of all words on the page.
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    pub word_count: usize,
    pub reading_time_minutes: usize,
    pub top_keywords: Vec<KeywordDensity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub total: usize,
    pub missing_alt: usize,
    /// Fraction of images with alt text, 0.0-1.0. 1.0 when there are no images.
    pub alt_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStats {
    pub internal: usize,
    pub external: usize,
    /// internal / (internal + external), 0.0 without links.
    pub internal_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenGraph {
    pub title: bool,
    pub description: bool,
    pub image: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalFlags {
    pub canonical: Option<String>,
    pub canonical_absolute: bool,
    pub has_meta_robots: bool,
    pub indexable: bool,
    pub followable: bool,
    pub has_viewport: bool,
    pub schema_count: usize,
    pub schema_types: Vec<String>,
    pub lang: Option<String>,
    pub is_https: bool,
    pub open_graph: OpenGraph,
    pub has_twitter_card: bool,
}

impl TechnicalFlags {
    pub fn has_canonical(&self) -> bool {
        self.canonical.is_some()
    }

    pub fn has_schema(&self) -> bool {
        self.schema_count > 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub load_time_ms: u64,
    pub byte_size: u64,
    pub compression: Option<String>,
}

impl PerformanceStats {
    pub fn is_compressed(&self) -> bool {
        self.compression
            .as_deref()
            .is_some_and(|enc| enc.contains("gzip") || enc.contains("br"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageIssue {
    pub severity: Severity,
    pub message: String,
}

/// Everything learned about one successfully fetched page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub depth: usize,
    pub status_code: u16,
    pub title: TextSignal,
    pub meta_description: TextSignal,
    pub headings: HeadingStats,
    pub content: ContentStats,
    pub images: ImageStats,
    pub links: LinkStats,
    pub technical: TechnicalFlags,
    pub performance: PerformanceStats,
    pub issues: Vec<PageIssue>,
    pub page_score: u8,
}

/// Analyze one crawled page. Never fails: missing or malformed markup simply
/// leaves the affected signals empty.
pub fn analyze_page(page: &CrawledPage) -> PageRecord {
    let response = &page.response;
    let document = Html::parse_document(&response.body);
    let parsed_url = Url::parse(&page.url).ok();
    let domain = parsed_url
        .as_ref()
        .and_then(|u| u.host_str())
        .unwrap_or_default()
        .to_string();

    let title = TextSignal::measure(extract_title(&document), TITLE_OPTIMAL);
    let meta_description = TextSignal::measure(
        meta_content(&document, "name", "description"),
        META_DESCRIPTION_OPTIMAL,
    );

    let extracted = extract_links(&response.body, &response.final_url, &domain);
    let total_links = extracted.internal_count + extracted.external_count;
    let links = LinkStats {
        internal: extracted.internal_count,
        external: extracted.external_count,
        internal_ratio: if total_links == 0 {
            0.0
        } else {
            round2(extracted.internal_count as f64 / total_links as f64)
        },
    };

    let mut technical = extract_technical(&document, response.header("x-robots-tag"));
    technical.is_https = Url::parse(&response.final_url).is_ok_and(|u| u.scheme() == "https");

    let mut record = PageRecord {
        url: page.url.clone(),
        depth: page.depth,
        status_code: response.status_code,
        title,
        meta_description,
        headings: extract_headings(&document),
        content: extract_content(&document),
        images: extract_images(&document),
        links,
        technical,
        performance: PerformanceStats {
            load_time_ms: response.response_time.as_millis() as u64,
            byte_size: response.byte_size,
            compression: response.compression.clone(),
        },
        issues: Vec::new(),
        page_score: 0,
    };

    record.issues = collect_issues(&record);
    record.page_score = page_score(&record);
    record
}

/// Weighted 0-100 score for a single page.
pub fn page_score(record: &PageRecord) -> u8 {
    let mut score: f64 = 0.0;

    score += match record.title.status {
        LengthStatus::Optimal => 15.0,
        LengthStatus::Warning => 8.0,
        LengthStatus::Error => 0.0,
    };
    score += match record.meta_description.status {
        LengthStatus::Optimal => 15.0,
        LengthStatus::Warning => 8.0,
        LengthStatus::Error => 0.0,
    };
    score += match record.headings.h1_status {
        CheckStatus::Good => 10.0,
        CheckStatus::Warning => 5.0,
        CheckStatus::Error => 0.0,
    };
    score += if record.content.word_count >= MIN_CONTENT_WORDS {
        10.0
    } else {
        5.0
    };
    score += record.images.alt_ratio.clamp(0.0, 1.0) * 10.0;

    let technical = &record.technical;
    for present in [
        technical.has_canonical(),
        technical.has_viewport,
        technical.lang.is_some(),
        technical.is_https,
        technical.has_schema(),
    ] {
        if present {
            score += 5.0;
        }
    }

    score += match record.performance.load_time_ms {
        ms if ms < SLOW_LOAD_MS => 10.0,
        ms if ms < VERY_SLOW_LOAD_MS => 5.0,
        _ => 0.0,
    };
    if record.performance.is_compressed() {
        score += 5.0;
    }

    score.round().clamp(0.0, 100.0) as u8
}

fn collect_issues(record: &PageRecord) -> Vec<PageIssue> {
    let mut issues = Vec::new();
    let mut push = |severity: Severity, message: String| {
        issues.push(PageIssue { severity, message })
    };

    match record.title.status {
        LengthStatus::Error => push(Severity::Error, "Page is missing a title tag".to_string()),
        LengthStatus::Warning => push(
            Severity::Warning,
            format!(
                "Title is {} characters (recommended: {}-{})",
                record.title.length,
                TITLE_OPTIMAL.start(),
                TITLE_OPTIMAL.end()
            ),
        ),
        LengthStatus::Optimal => {}
    }

    match record.meta_description.status {
        LengthStatus::Error => push(
            Severity::Error,
            "Page is missing a meta description".to_string(),
        ),
        LengthStatus::Warning => push(
            Severity::Warning,
            format!(
                "Meta description is {} characters (recommended: {}-{})",
                record.meta_description.length,
                META_DESCRIPTION_OPTIMAL.start(),
                META_DESCRIPTION_OPTIMAL.end()
            ),
        ),
        LengthStatus::Optimal => {}
    }

    match record.headings.h1_status {
        CheckStatus::Error => push(Severity::Error, "Page is missing an H1 tag".to_string()),
        CheckStatus::Warning => push(
            Severity::Warning,
            format!("Page has multiple H1 tags ({})", record.headings.h1.len()),
        ),
        CheckStatus::Good => {}
    }
    for skip in &record.headings.hierarchy_skips {
        push(
            Severity::Warning,
            format!("Heading hierarchy skips a level ({})", skip),
        );
    }

    if record.content.word_count < MIN_CONTENT_WORDS {
        push(
            Severity::Warning,
            format!(
                "Thin content: {} words (recommended: at least {})",
                record.content.word_count, MIN_CONTENT_WORDS
            ),
        );
    }

    if record.images.missing_alt > 0 {
        push(
            Severity::Warning,
            format!("{} image(s) missing alt text", record.images.missing_alt),
        );
    }

    let technical = &record.technical;
    if !technical.is_https {
        push(Severity::Error, "Page is not served over HTTPS".to_string());
    }
    if !technical.has_canonical() {
        push(Severity::Warning, "No canonical link tag".to_string());
    } else if !technical.canonical_absolute {
        push(Severity::Warning, "Canonical URL is not absolute".to_string());
    }
    if !technical.has_viewport {
        push(Severity::Warning, "No viewport meta tag".to_string());
    }
    if technical.lang.is_none() {
        push(Severity::Warning, "No lang attribute on <html>".to_string());
    }
    if !technical.indexable {
        push(Severity::Warning, "Page is marked noindex".to_string());
    }

    if record.performance.load_time_ms >= SLOW_LOAD_MS {
        push(
            Severity::Warning,
            format!("Slow response: {} ms", record.performance.load_time_ms),
        );
    }

    issues
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match selector(css) {
        Some(sel) => document.select(&sel).collect(),
        None => Vec::new(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() { None } else { Some(text) }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn extract_title(document: &Html) -> Option<String> {
    select_all(document, "title")
        .into_iter()
        .next()
        .and_then(|el| non_empty(element_text(el)))
}

/// Content of the first `<meta {attr}="{key}">`, matched case-insensitively.
fn meta_content(document: &Html, attr: &str, key: &str) -> Option<String> {
    select_all(document, &format!("meta[{}]", attr))
        .into_iter()
        .find(|el| {
            el.value()
                .attr(attr)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(key))
        })
        .and_then(|el| el.value().attr("content"))
        .and_then(|content| non_empty(collapse_whitespace(content)))
}

fn has_meta(document: &Html, attr: &str, key: &str) -> bool {
    select_all(document, &format!("meta[{}]", attr))
        .into_iter()
        .any(|el| {
            el.value()
                .attr(attr)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(key))
        })
}

fn extract_headings(document: &Html) -> HeadingStats {
    let mut levels: [Vec<String>; 6] = Default::default();
    let mut hierarchy_skips = Vec::new();
    let mut previous: Option<usize> = None;

    for element in select_all(document, "h1, h2, h3, h4, h5, h6") {
        let Some(level) = element.value().name()[1..].parse::<usize>().ok() else {
            continue;
        };
        if let Some(prev) = previous
            && level > prev + 1
        {
            hierarchy_skips.push(format!("H{} -> H{}", prev, level));
        }
        previous = Some(level);
        levels[level - 1].push(element_text(element));
    }

    let h1_status = match levels[0].len() {
        0 => CheckStatus::Error,
        1 => CheckStatus::Good,
        _ => CheckStatus::Warning,
    };
    let [h1, h2, h3, h4, h5, h6] = levels;

    HeadingStats {
        h1,
        h2,
        h3,
        h4,
        h5,
        h6,
        h1_status,
        hierarchy_skips,
    }
}

/// Text a reader would see: everything under `<body>` except script-like elements.
fn visible_text(document: &Html) -> String {
    let root = select_all(document, "body")
        .into_iter()
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut text = String::new();
    for node in root.descendants() {
        let Some(fragment) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor.value().as_element().is_some_and(|el| {
                matches!(el.name(), "script" | "style" | "noscript" | "template")
            })
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }
    text
}

fn extract_content(document: &Html) -> ContentStats {
    let text = visible_text(document);
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect();
    let word_count = words.len();

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for word in &words {
        let normalized = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if normalized.chars().count() > 3 && !normalized.chars().all(|c| c.is_ascii_digit()) {
            *frequencies.entry(normalized).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = frequencies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let top_keywords = ranked
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(word, count)| KeywordDensity {
            density: round2(count as f64 / word_count as f64 * 100.0),
            word,
            count,
        })
        .collect();

    ContentStats {
        word_count,
        reading_time_minutes: word_count.div_ceil(WORDS_PER_MINUTE).max(1),
        top_keywords,
    }
}

fn extract_images(document: &Html) -> ImageStats {
    let images = select_all(document, "img");
    let total = images.len();
    let missing_alt = images
        .iter()
        .filter(|img| img.value().attr("alt").is_none_or(|alt| alt.trim().is_empty()))
        .count();

    ImageStats {
        total,
        missing_alt,
        alt_ratio: if total == 0 {
            1.0
        } else {
            round2((total - missing_alt) as f64 / total as f64)
        },
    }
}

fn extract_technical(document: &Html, x_robots_tag: Option<&str>) -> TechnicalFlags {
    let canonical = select_all(document, "link[rel][href]")
        .into_iter()
        .find(|el| {
            el.value().attr("rel").is_some_and(|rel| {
                rel.split_whitespace()
                    .any(|r| r.eq_ignore_ascii_case("canonical"))
            })
        })
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| non_empty(href.trim().to_string()));
    let canonical_absolute = canonical
        .as_deref()
        .and_then(|href| Url::parse(href).ok())
        .is_some_and(|u| matches!(u.scheme(), "http" | "https"));

    let meta_robots = meta_content(document, "name", "robots");
    let has_meta_robots = has_meta(document, "name", "robots");
    let directives = format!(
        "{} {}",
        meta_robots.as_deref().unwrap_or_default(),
        x_robots_tag.unwrap_or_default()
    )
    .to_ascii_lowercase();
    let tokens: Vec<&str> = directives
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();
    let has_token = |name: &str| tokens.contains(&name);
    let blocks_all = has_token("none");
    let indexable = !blocks_all && !has_token("noindex");
    let followable = !blocks_all && !has_token("nofollow");

    let mut schema_types: Vec<String> = Vec::new();
    let json_ld: Vec<ElementRef> = select_all(document, "script[type]")
        .into_iter()
        .filter(|el| {
            el.value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        })
        .collect();
    for script in &json_ld {
        let raw: String = script.text().collect();
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) {
            collect_schema_types(&value, &mut schema_types);
        }
    }
    let microdata = select_all(document, "[itemscope][itemtype]");
    for item in &microdata {
        if let Some(kind) = item
            .value()
            .attr("itemtype")
            .and_then(|t| t.trim().trim_end_matches('/').rsplit('/').next())
            .filter(|k| !k.is_empty())
        {
            push_unique(&mut schema_types, kind);
        }
    }

    let lang = document
        .root_element()
        .value()
        .attr("lang")
        .and_then(|l| non_empty(l.trim().to_string()));

    TechnicalFlags {
        canonical,
        canonical_absolute,
        has_meta_robots,
        indexable,
        followable,
        has_viewport: has_meta(document, "name", "viewport"),
        schema_count: json_ld.len() + microdata.len(),
        schema_types,
        lang,
        is_https: false,
        open_graph: OpenGraph {
            title: has_meta(document, "property", "og:title"),
            description: has_meta(document, "property", "og:description"),
            image: has_meta(document, "property", "og:image"),
        },
        has_twitter_card: has_meta(document, "name", "twitter:card"),
    }
}

fn collect_schema_types(value: &serde_json::Value, types: &mut Vec<String>) {
    use serde_json::Value;

    match value {
        Value::Array(items) => {
            for item in items {
                collect_schema_types(item, types);
            }
        }
        Value::Object(map) => {
            match map.get("@type") {
                Some(Value::String(kind)) => push_unique(types, kind),
                Some(Value::Array(kinds)) => {
                    for kind in kinds.iter().filter_map(Value::as_str) {
                        push_unique(types, kind);
                    }
                }
                _ => {}
            }
            if let Some(graph) = map.get("@graph") {
                collect_schema_types(graph, types);
            }
        }
        _ => {}
    }
}

fn push_unique(types: &mut Vec<String>, kind: &str) {
    if !types.iter().any(|t| t == kind) {
        types.push(kind.to_string());
    }
}
