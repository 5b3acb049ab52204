use crate::error::{FetchError, Result};
use crate::result::FetchedPage;
use flate2::read::GzDecoder;
use reqwest::Client;
use reqwest::header::{ACCEPT_ENCODING, HeaderMap, HeaderValue};
use std::collections::BTreeMap;
use std::io::Read;
use std::time::{Duration, Instant};
use tracing::debug;

pub const USER_AGENT: &str = concat!(
    "seoscope/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/trapdoorsec/seoscope)"
);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Single-request HTTP GET with a fixed user agent and timeout.
///
/// Automatic decompression is switched off so the `Content-Encoding` header
/// reaches the page analyzer; gzip bodies are inflated here instead.
#[derive(Clone, Debug)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_TIMEOUT, USER_AGENT)
    }

    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .no_gzip()
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    /// GET `url` and return the response whatever its status code.
    /// Only transport failures are errors.
    pub async fn get(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let mut page = FetchedPage::new(url.to_string());
        page.final_url = response.url().to_string();
        page.status_code = response.status().as_u16();

        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_string())
                    .and_modify(|existing| {
                        existing.push_str(", ");
                        existing.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }
        }

        let raw = response.bytes().await.map_err(FetchError::from_transport)?;
        page.response_time = start.elapsed();
        page.byte_size = raw.len() as u64;

        let encoding = headers
            .get("content-encoding")
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty() && e != "identity");

        page.body = match encoding.as_deref() {
            None => String::from_utf8_lossy(&raw).into_owned(),
            Some("gzip" | "x-gzip") => decode_gzip(&raw)?,
            Some(other) => {
                return Err(FetchError::Decode(format!(
                    "unsupported content-encoding '{}'",
                    other
                )));
            }
        };
        page.compression = encoding;
        page.content_type = headers.get("content-type").cloned();
        page.headers = headers;

        debug!(
            "{} -> {} ({} bytes, {:?})",
            url, page.status_code, page.byte_size, page.response_time
        );
        Ok(page)
    }

    /// GET `url`, treating any non-2xx status as a failure.
    pub async fn fetch(&self, url: &str) -> std::result::Result<FetchedPage, FetchError> {
        let page = self.get(url).await?;
        if !page.is_success() {
            return Err(FetchError::Status(page.status_code));
        }
        Ok(page)
    }
}

fn decode_gzip(raw: &[u8]) -> std::result::Result<String, FetchError> {
    let mut decoder = GzDecoder::new(raw);
    let mut decoded = Vec::new();
    decoder
        .read_to_end(&mut decoded)
        .map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(String::from_utf8_lossy(&decoded).into_owned())
}
