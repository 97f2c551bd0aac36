//! Job-posting text extraction from a URL.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::{Client, Response, Url};
use scraper::node::Node;
use scraper::Html;
use tracing::{debug, warn};

use super::{ExtractedText, ExtractionFailure};

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Largest job page body read into memory.
pub const DEFAULT_MAX_PAGE_BYTES: usize = 5 * 1024 * 1024;

/// Sent with every job-page request; many job boards reject non-browser agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Elements whose text is never page content.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript"];

/// Fetches a page and flattens its visible text into a single prompt-ready string.
#[derive(Debug, Clone)]
pub struct WebPageExtractor {
    client: Client,
    timeout: Duration,
    max_page_bytes: usize,
}

impl WebPageExtractor {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            timeout,
            max_page_bytes: DEFAULT_MAX_PAGE_BYTES,
        })
    }

    pub fn with_max_page_bytes(mut self, max_page_bytes: usize) -> Self {
        self.max_page_bytes = max_page_bytes;
        self
    }

    /// Single GET, no retries. Any transport error, timeout, non-2xx status,
    /// oversized body or page without visible text is an `ExtractionFailure`.
    pub async fn extract(&self, url: &str) -> Result<ExtractedText, ExtractionFailure> {
        let url = parse_url(url)?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.fetch_failure(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Job page {url} returned {status}");
            return Err(ExtractionFailure::Status(status.as_u16()));
        }

        let body = self.read_body(&url, response).await?;

        let text = html_to_text(&body);
        debug!(
            "Extracted {} chars of job description from {url}",
            text.len()
        );

        ExtractedText::new(text).ok_or(ExtractionFailure::NoText)
    }

    /// Reads the body chunk by chunk, giving up once it passes `max_page_bytes`.
    async fn read_body(
        &self,
        url: &Url,
        mut response: Response,
    ) -> Result<String, ExtractionFailure> {
        let limit = self.max_page_bytes;
        let too_large = || {
            warn!("Job page {url} is larger than {limit} bytes");
            ExtractionFailure::TooLarge { limit }
        };

        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.fetch_failure(url, e))?
        {
            if body.len() + chunk.len() > limit {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn fetch_failure(&self, url: &Url, error: reqwest::Error) -> ExtractionFailure {
        if error.is_timeout() {
            warn!(
                "Fetching {url} timed out after {}ms",
                self.timeout.as_millis()
            );
            ExtractionFailure::Timeout(self.timeout)
        } else {
            warn!("Fetching {url} failed: {error}");
            ExtractionFailure::Fetch(error.to_string())
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, ExtractionFailure> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ExtractionFailure::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ExtractionFailure::InvalidUrl(format!(
            "{raw}: scheme '{other}' is not supported"
        ))),
    }
}

/// Visible text of an HTML document, collapsed to single-spaced phrases.
pub(crate) fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut raw = String::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(el) if NON_CONTENT_TAGS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        raw.push_str(text);
        raw.push('\n');
    }

    collapse_whitespace(&raw)
}

/// Strips each line, splits it on runs of two or more spaces, and joins every
/// non-empty phrase with a single space.
fn collapse_whitespace(text: &str) -> String {
    static PHRASE_BREAK: OnceLock<Regex> = OnceLock::new();
    let phrase_break = PHRASE_BREAK.get_or_init(|| Regex::new(r"\s{2,}").expect("valid regex"));

    text.lines()
        .map(str::trim)
        .flat_map(|line| phrase_break.split(line))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
