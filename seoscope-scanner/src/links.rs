use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// Paths ending in these are assets, not documents, and never enter the frontier.
pub const SKIPPED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".ico", ".css", ".js",
];

/// Links found in one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedLinks {
    /// Canonical same-site page URLs, in document order, de-duplicated.
    pub internal: Vec<String>,
    /// Every same-site anchor, counted before filtering and de-duplication.
    pub internal_count: usize,
    pub external_count: usize,
}

/// Reduce a URL to its comparison key: `scheme://host[:port]/path[?query]`.
///
/// The fragment and any credentials are dropped. Only http(s) URLs have a key.
pub fn canonicalize(url: &str) -> Option<String> {
    let mut parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    parsed.set_fragment(None);
    let _ = parsed.set_username("");
    let _ = parsed.set_password(None);
    Some(parsed.to_string())
}

/// Same-site test: hosts match case-insensitively, ignoring a leading `www.`.
pub fn is_same_site(url: &Url, domain: &str) -> bool {
    match url.host_str() {
        Some(host) => strip_www(host).eq_ignore_ascii_case(strip_www(domain)),
        None => false,
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

pub fn has_skipped_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Resolve an href against the page URL, discarding non-navigational schemes.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    Some(resolved)
}

/// Parse `html` and collect its anchors relative to `page_url`.
///
/// A `<base href>` in the document overrides `page_url` for resolution.
pub fn extract_links(html: &str, page_url: &str, domain: &str) -> ExtractedLinks {
    let mut links = ExtractedLinks::default();
    let Ok(page) = Url::parse(page_url) else {
        return links;
    };

    let document = Html::parse_document(html);
    let base = Selector::parse("base[href]")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .and_then(|el| el.value().attr("href"))
                .and_then(|href| page.join(href.trim()).ok())
        })
        .unwrap_or(page);

    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return links;
    };

    let mut seen = HashSet::new();
    for element in document.select(&anchor_selector) {
        let Some(resolved) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_href(&base, href))
        else {
            continue;
        };

        if !is_same_site(&resolved, domain) {
            links.external_count += 1;
            continue;
        }
        links.internal_count += 1;

        if has_skipped_extension(&resolved) {
            debug!("  -> Skipping asset link {}", resolved);
            continue;
        }
        if let Some(canonical) = canonicalize(resolved.as_str())
            && seen.insert(canonical.clone())
        {
            links.internal.push(canonical);
        }
    }

    links
}
