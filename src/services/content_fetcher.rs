use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

use crate::error::Result;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";
const TEXT_WIDTH: usize = 200;
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("invalid URL {0:?}")]
    InvalidUrl(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Text of the watched region plus the page `<title>`, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    pub text: String,
    pub title: Option<String>,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(
        &self,
        url: &str,
        selector: Option<&str>,
    ) -> std::result::Result<FetchedPage, FetchError>;
}

pub struct ContentFetcher {
    client: Client,
    timeout: Duration,
}

impl ContentFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .map_err(FetchError::from)?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(error)
        }
    }
}

#[async_trait]
impl PageFetcher for ContentFetcher {
    async fn fetch(
        &self,
        url: &str,
        selector: Option<&str>,
    ) -> std::result::Result<FetchedPage, FetchError> {
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
            _ => return Err(FetchError::InvalidUrl(url.to_string())),
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            tracing::debug!("Failed to fetch {}: {}", url, response.status());
            return Err(FetchError::Status(response.status()));
        }

        let html = response.text().await.map_err(|e| self.classify(e))?;

        Ok(extract_page(&html, selector))
    }
}

/// Extract the text of every element matching `selector` (the whole document
/// when `None`). Selectors that match nothing or fail to parse give empty text.
pub fn extract_page(html: &str, selector: Option<&str>) -> FetchedPage {
    let document = Html::parse_document(html);
    let title = page_title(&document);

    let text = match selector {
        None => html_to_text(html),
        Some(raw) => match Selector::parse(raw) {
            Ok(selector) => document
                .select(&selector)
                .map(|element| html_to_text(&element.html()))
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => {
                tracing::debug!("Invalid selector {:?}: {:?}", raw, e);
                String::new()
            }
        },
    };

    FetchedPage { text, title }
}

fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

fn html_to_text(html: &str) -> String {
    let text = match html2text::from_read(html.as_bytes(), TEXT_WIDTH) {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!("Failed to convert HTML to text: {}", e);
            return String::new();
        }
    };

    // Clean up the text - remove excessive whitespace
    text.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
