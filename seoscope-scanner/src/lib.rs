pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod links;
pub mod result;
pub mod robots;
pub mod sitemap;

pub use crawler::{CrawlEvent, CrawlEventCallback, CrawlState, CrawlTarget, Crawler};
pub use error::{FetchError, ScanError};
pub use fetcher::Fetcher;
pub use result::{CheckStatus, CrawledPage, FailedUrl, FetchedPage};
pub use robots::{RobotsResult, analyze_robots};
pub use sitemap::{SitemapResult, analyze_sitemap};
