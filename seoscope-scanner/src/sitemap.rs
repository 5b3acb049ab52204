use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use crate::result::CheckStatus;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

pub const SITEMAP_NS: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

/// Probed in order; the first 200 wins.
pub const SITEMAP_PATHS: &[&str] = &["/sitemap.xml", "/sitemap_index.xml", "/sitemaps.xml"];

/// Entries kept in the report. `total_urls` still counts all of them.
pub const MAX_REPORTED_URLS: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub loc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSitemap {
    pub is_index: bool,
    pub entries: Vec<SitemapEntry>,
    pub child_sitemaps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitemapResult {
    pub exists: bool,
    pub accessible: bool,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub is_index: bool,
    #[serde(rename = "totalURLs")]
    pub total_urls: usize,
    pub urls: Vec<SitemapEntry>,
    pub child_sitemaps: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SitemapResult {
    fn missing(accessible: bool, error: Option<String>) -> Self {
        Self {
            exists: false,
            accessible,
            status: CheckStatus::Warning,
            url: None,
            is_index: false,
            total_urls: 0,
            urls: Vec::new(),
            child_sitemaps: Vec::new(),
            error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Root {
    UrlSet,
    Index,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Loc,
    LastMod,
    Priority,
    ChangeFreq,
}

/// Parse a `<urlset>` or `<sitemapindex>` document in the sitemap 0.9 namespace.
pub fn parse_sitemap(xml: &str) -> Result<ParsedSitemap> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedSitemap::default();
    let mut root: Option<Root> = None;
    let mut open_elements = 0usize;
    let mut current: Option<SitemapEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|e| ScanError::ParseError(format!("malformed sitemap XML: {}", e)))?;
        let in_ns = matches!(ns, ResolveResult::Bound(Namespace(n)) if n == SITEMAP_NS);

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_empty = matches!(event, Event::Empty(_));
                let local = e.local_name();
                let name = local.as_ref();

                if root.is_none() {
                    root = match (in_ns, name) {
                        (true, b"urlset") => Some(Root::UrlSet),
                        (true, b"sitemapindex") => Some(Root::Index),
                        _ => {
                            return Err(ScanError::ParseError(format!(
                                "not a sitemap document: unexpected root <{}>",
                                String::from_utf8_lossy(name)
                            )));
                        }
                    };
                    parsed.is_index = root == Some(Root::Index);
                } else if in_ns {
                    match name {
                        b"url" if root == Some(Root::UrlSet) => current = Some(SitemapEntry::default()),
                        b"sitemap" if root == Some(Root::Index) => {
                            current = Some(SitemapEntry::default())
                        }
                        b"loc" if current.is_some() => field = Some(Field::Loc),
                        b"lastmod" if current.is_some() => field = Some(Field::LastMod),
                        b"priority" if current.is_some() => field = Some(Field::Priority),
                        b"changefreq" if current.is_some() => field = Some(Field::ChangeFreq),
                        _ => {}
                    }
                }

                if is_empty {
                    field = None;
                } else {
                    open_elements += 1;
                }
            }
            Event::Text(ref e) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map_err(|e| ScanError::ParseError(format!("malformed sitemap XML: {}", e)))?;
                    set_field(entry, f, text.trim());
                }
            }
            Event::CData(e) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let raw = e.into_inner();
                    set_field(entry, f, String::from_utf8_lossy(&raw).trim());
                }
            }
            Event::End(ref e) => {
                open_elements = open_elements.saturating_sub(1);
                field = None;
                let local = e.local_name();
                let closes_entry = in_ns && matches!(local.as_ref(), b"url" | b"sitemap");
                if closes_entry && let Some(entry) = current.take() {
                    if entry.loc.is_empty() {
                        debug!("Skipping sitemap entry without <loc>");
                    } else if parsed.is_index {
                        parsed.child_sitemaps.push(entry.loc);
                    } else {
                        parsed.entries.push(entry);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if root.is_none() {
        return Err(ScanError::ParseError(
            "not a sitemap document: no root element".to_string(),
        ));
    }
    if open_elements != 0 {
        return Err(ScanError::ParseError(
            "malformed sitemap XML: unexpected end of document".to_string(),
        ));
    }

    Ok(parsed)
}

fn set_field(entry: &mut SitemapEntry, field: Field, text: &str) {
    if text.is_empty() {
        return;
    }
    match field {
        Field::Loc => entry.loc.push_str(text),
        Field::LastMod => entry.lastmod = Some(text.to_string()),
        Field::Priority => entry.priority = text.parse::<f64>().ok(),
        Field::ChangeFreq => entry.changefreq = Some(text.to_ascii_lowercase()),
    }
}

/// Probe the well-known sitemap locations, then any declared in robots.txt.
///
/// A sitemap that is found but cannot be parsed is an `error`; finding none is a
/// `warning`. Neither aborts the audit.
pub async fn analyze_sitemap(fetcher: &Fetcher, base: &Url, declared: &[String]) -> SitemapResult {
    let mut candidates: Vec<String> = Vec::new();
    for location in SITEMAP_PATHS
        .iter()
        .copied()
        .chain(declared.iter().map(|s| s.as_str()))
    {
        if let Ok(url) = base.join(location) {
            let url = url.to_string();
            if !candidates.contains(&url) {
                candidates.push(url);
            }
        }
    }

    let mut accessible = false;
    let mut last_error: Option<String> = None;

    for candidate in candidates {
        let page = match fetcher.get(&candidate).await {
            Ok(page) => page,
            Err(e) => {
                debug!("Sitemap probe {} failed: {}", candidate, e);
                last_error = Some(e.to_string());
                continue;
            }
        };
        accessible = true;
        if page.status_code != 200 {
            debug!("Sitemap probe {} returned {}", candidate, page.status_code);
            continue;
        }

        return match parse_sitemap(&page.body) {
            Ok(parsed) => {
                info!(
                    "Sitemap found at {}: {} URLs, {} child sitemaps",
                    candidate,
                    parsed.entries.len(),
                    parsed.child_sitemaps.len()
                );
                let total_urls = parsed.entries.len();
                let mut urls = parsed.entries;
                urls.truncate(MAX_REPORTED_URLS);
                SitemapResult {
                    exists: true,
                    accessible: true,
                    status: CheckStatus::Good,
                    url: Some(candidate),
                    is_index: parsed.is_index,
                    total_urls,
                    urls,
                    child_sitemaps: parsed.child_sitemaps,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Sitemap at {} could not be parsed: {}", candidate, e);
                SitemapResult {
                    exists: true,
                    accessible: true,
                    status: CheckStatus::Error,
                    url: Some(candidate),
                    is_index: false,
                    total_urls: 0,
                    urls: Vec::new(),
                    child_sitemaps: Vec::new(),
                    error: Some(e.to_string()),
                }
            }
        };
    }

    info!("No sitemap found");
    SitemapResult::missing(accessible, last_error)
}
