use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Traffic-light status shared by the robots, sitemap and heading checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Good,
    Warning,
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Good => "good",
            CheckStatus::Warning => "warning",
            CheckStatus::Error => "error",
        }
    }
}

/// One HTTP response, body already decoded to text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    /// Header names are lowercased.
    pub headers: BTreeMap<String, String>,
    pub body: String,
    /// Bytes on the wire, before any decompression.
    pub byte_size: u64,
    pub response_time: Duration,
    /// Value of `Content-Encoding`, if the server compressed the response.
    pub compression: Option<String>,
}

impl FetchedPage {
    pub fn new(url: String) -> Self {
        Self {
            final_url: url.clone(),
            url,
            status_code: 0,
            content_type: None,
            headers: BTreeMap::new(),
            body: String::new(),
            byte_size: 0,
            response_time: Duration::from_secs(0),
            compression: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_ref()
            .map(|ct| {
                let ct = ct.to_ascii_lowercase();
                ct.contains("text/html") || ct.contains("application/xhtml")
            })
            // Servers that omit the header are assumed to be serving markup
            .unwrap_or(true)
    }
}

/// A successfully fetched page together with its BFS depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawledPage {
    pub url: String,
    pub depth: usize,
    pub response: FetchedPage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedUrl {
    pub url: String,
    pub depth: usize,
    pub reason: String,
}
