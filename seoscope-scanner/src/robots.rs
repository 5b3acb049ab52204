use crate::fetcher::Fetcher;
use crate::result::CheckStatus;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

/// Directives read out of a robots.txt body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsDirectives {
    pub user_agents: Vec<String>,
    pub disallow_patterns: Vec<String>,
    pub allow_patterns: Vec<String>,
    pub sitemaps: Vec<String>,
    pub crawl_delay: Option<f64>,
}

/// Outcome of probing `/robots.txt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotsResult {
    pub exists: bool,
    pub accessible: bool,
    pub status: CheckStatus,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(flatten)]
    pub directives: RobotsDirectives,
    pub raw_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RobotsResult {
    fn empty(url: String, status: CheckStatus) -> Self {
        Self {
            exists: false,
            accessible: false,
            status,
            url,
            status_code: None,
            directives: RobotsDirectives::default(),
            raw_size: 0,
            error: None,
        }
    }
}

/// Case-insensitive line parser for the directives an audit reports on.
///
/// Directives are collected regardless of the user-agent group they belong to.
pub fn parse_robots(txt: &str) -> RobotsDirectives {
    let mut directives = RobotsDirectives::default();

    for line in txt.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "user-agent" if !value.is_empty() => {
                if !directives.user_agents.iter().any(|ua| ua == value) {
                    directives.user_agents.push(value.to_string());
                }
            }
            "disallow" if !value.is_empty() => directives.disallow_patterns.push(value.to_string()),
            "allow" if !value.is_empty() => directives.allow_patterns.push(value.to_string()),
            "sitemap" if !value.is_empty() => directives.sitemaps.push(value.to_string()),
            "crawl-delay" => {
                if directives.crawl_delay.is_none()
                    && let Ok(delay) = value.parse::<f64>()
                {
                    directives.crawl_delay = Some(delay);
                }
            }
            _ => {}
        }
    }

    directives
}

/// Fetch and parse `{base}/robots.txt`.
///
/// 200 is `good`; any other status means the file does not exist (`warning`);
/// a transport failure is an `error`.
pub async fn analyze_robots(fetcher: &Fetcher, base: &Url) -> RobotsResult {
    let robots_url = match base.join("/robots.txt") {
        Ok(url) => url.to_string(),
        Err(e) => {
            let mut result = RobotsResult::empty(base.to_string(), CheckStatus::Error);
            result.error = Some(e.to_string());
            return result;
        }
    };

    match fetcher.get(&robots_url).await {
        Ok(page) if page.status_code == 200 => {
            let directives = parse_robots(&page.body);
            info!(
                "robots.txt found: {} disallow, {} allow, {} sitemap(s)",
                directives.disallow_patterns.len(),
                directives.allow_patterns.len(),
                directives.sitemaps.len()
            );
            RobotsResult {
                exists: true,
                accessible: true,
                status: CheckStatus::Good,
                url: robots_url,
                status_code: Some(page.status_code),
                directives,
                raw_size: page.body.len(),
                error: None,
            }
        }
        Ok(page) => {
            info!("robots.txt returned HTTP {}", page.status_code);
            let mut result = RobotsResult::empty(robots_url, CheckStatus::Warning);
            result.accessible = true;
            result.status_code = Some(page.status_code);
            result.error = Some(format!("robots.txt returned HTTP {}", page.status_code));
            result
        }
        Err(e) => {
            warn!("robots.txt fetch failed: {}", e);
            let mut result = RobotsResult::empty(robots_url, CheckStatus::Error);
            result.error = Some(e.to_string());
            result
        }
    }
}
