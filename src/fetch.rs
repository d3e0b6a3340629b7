// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page fetching for URL scans.

use crate::config::FetchConfig;
use crate::document::StaticDocument;
use crate::error::{ClarabotError, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Body characters quoted in fetch errors
const ERROR_SNIPPET_CHARS: usize = 200;

/// A downloaded page
#[derive(Debug, Clone, Serialize)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub html: String,
    /// Visible text, see [`extract_text`]
    pub text: String,
}

/// Something that can download a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// Accept only absolute http(s) URLs
pub fn validate_url(input: &str) -> Result<Url> {
    let url = Url::parse(input.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClarabotError::Fetch(format!(
            "Unsupported URL scheme '{}': only http and https can be fetched",
            other
        ))),
    }
}

/// Rendered text of a page, as [`StaticDocument::text`] sees it
pub fn extract_text(html: &str) -> String {
    StaticDocument::parse(html).text()
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let url = validate_url(url)?;
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            let snippet: String = body.chars().take(ERROR_SNIPPET_CHARS).collect();
            return Err(ClarabotError::Fetch(format!(
                "Failed to fetch: {} - {}",
                status, snippet
            )));
        }

        debug!("Fetched {} bytes from {}", body.len(), final_url);

        Ok(FetchedPage {
            url: final_url,
            text: extract_text(&body),
            html: body,
        })
    }
}
