use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use crate::links::{canonicalize, extract_links};
use crate::result::{CrawledPage, FailedUrl};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Progress notifications emitted while the crawl runs.
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    Fetching { url: String, depth: usize },
    Crawled { url: String, status_code: u16, crawled: usize },
    Failed { url: String, reason: String },
    Done { crawled: usize, failed: usize },
}

pub type CrawlEventCallback = Arc<dyn Fn(&CrawlEvent) + Send + Sync>;

/// What to crawl and how far. Fixed for the duration of one audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub base_url: String,
    pub domain: String,
    pub max_pages: usize,
    pub max_depth: usize,
}

impl CrawlTarget {
    pub fn new(url: &str, max_pages: usize, max_depth: usize) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;
        let domain = parsed
            .host_str()
            .ok_or_else(|| ScanError::InvalidUrl(format!("{}: no host", url)))?
            .to_ascii_lowercase();
        let base_url = canonicalize(parsed.as_str())
            .ok_or_else(|| ScanError::InvalidUrl(format!("{}: not an http(s) URL", url)))?;

        Ok(Self {
            base_url,
            domain,
            max_pages,
            max_depth,
        })
    }
}

/// A queued URL and the BFS distance at which it was first discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: usize,
}

/// Everything a crawl learned. Created fresh for each crawl.
#[derive(Debug, Default, Clone)]
pub struct CrawlState {
    pub crawled_urls: HashSet<String>,
    pub failed_urls: HashSet<String>,
    pub failures: Vec<FailedUrl>,
    /// Successfully fetched pages in crawl order.
    pub pages: Vec<CrawledPage>,
    /// Page URL -> links first discovered on that page.
    pub site_structure: BTreeMap<String, Vec<String>>,
}

impl CrawlState {
    pub fn crawled_count(&self) -> usize {
        self.crawled_urls.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed_urls.len()
    }

    fn is_visited(&self, url: &str) -> bool {
        self.crawled_urls.contains(url) || self.failed_urls.contains(url)
    }
}

/// Sequential breadth-first crawler bounded by page count and depth.
pub struct Crawler {
    fetcher: Fetcher,
    delay: Duration,
    event_callback: Option<CrawlEventCallback>,
}

impl Crawler {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            delay: DEFAULT_DELAY,
            event_callback: None,
        }
    }

    /// Pause between consecutive fetches.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_event_callback(mut self, callback: CrawlEventCallback) -> Self {
        self.event_callback = Some(callback);
        self
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.event_callback {
            callback(&event);
        }
    }

    pub async fn crawl(&self, target: &CrawlTarget) -> CrawlState {
        info!(
            "Starting crawl of {} (max {} pages, depth {})",
            target.base_url, target.max_pages, target.max_depth
        );

        let mut state = CrawlState::default();
        let mut frontier: VecDeque<FrontierEntry> = VecDeque::new();
        // Every URL ever enqueued; a link enters the frontier at most once.
        let mut discovered: HashSet<String> = HashSet::new();

        discovered.insert(target.base_url.clone());
        frontier.push_back(FrontierEntry {
            url: target.base_url.clone(),
            depth: 0,
        });

        while state.crawled_count() < target.max_pages {
            let Some(FrontierEntry { url, depth }) = frontier.pop_front() else {
                break;
            };

            if state.is_visited(&url) || depth > target.max_depth {
                continue;
            }

            self.emit(CrawlEvent::Fetching {
                url: url.clone(),
                depth,
            });

            match self.fetcher.fetch(&url).await {
                Err(e) => {
                    warn!("Crawl error for {}: {}", url, e);
                    let reason = e.to_string();
                    state.failed_urls.insert(url.clone());
                    state.failures.push(FailedUrl {
                        url: url.clone(),
                        depth,
                        reason: reason.clone(),
                    });
                    self.emit(CrawlEvent::Failed { url, reason });
                }
                Ok(response) => {
                    let new_links = if depth < target.max_depth && response.is_html() {
                        extract_links(&response.body, &response.final_url, &target.domain).internal
                    } else {
                        Vec::new()
                    };

                    state.crawled_urls.insert(url.clone());
                    self.emit(CrawlEvent::Crawled {
                        url: url.clone(),
                        status_code: response.status_code,
                        crawled: state.crawled_count(),
                    });

                    let mut edges = Vec::new();
                    for link in new_links {
                        if state.is_visited(&link) || !discovered.insert(link.clone()) {
                            continue;
                        }
                        debug!("Queuing {} at depth {}", link, depth + 1);
                        frontier.push_back(FrontierEntry {
                            url: link.clone(),
                            depth: depth + 1,
                        });
                        edges.push(link);
                    }
                    if !edges.is_empty() {
                        state.site_structure.insert(url.clone(), edges);
                    }

                    state.pages.push(CrawledPage {
                        url,
                        depth,
                        response,
                    });
                }
            }

            if !self.delay.is_zero()
                && !frontier.is_empty()
                && state.crawled_count() < target.max_pages
            {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            "Crawl complete. Crawled {} pages, {} failed",
            state.crawled_count(),
            state.failed_count()
        );
        self.emit(CrawlEvent::Done {
            crawled: state.crawled_count(),
            failed: state.failed_count(),
        });
        state
    }
}
