// SPDX-License-Identifier: PMPL-1.0-or-later
//! Remote rewriter backed by an OpenAI-compatible chat completions API.
//!
//! # Security considerations
//!
//! - The API key is read from the environment variable named in the config
//!   and passed only to `bearer_auth()`. It is never logged, serialized, or
//!   included in error messages.

use crate::config::RemoteConfig;
use crate::error::{ClarabotError, Result};
use crate::rewrite::Rewriter;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You rewrite text to be inclusive, plain, accessible, and easy to understand while preserving meaning.";

const TEMPERATURE: f64 = 0.3;

/// Body characters quoted in error messages
const ERROR_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completions client
pub struct RemoteRewriter {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl RemoteRewriter {
    /// Build a rewriter for `endpoint` (base URL without `/chat/completions`)
    pub fn new(endpoint: &str, model: &str, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        })
    }

    /// Build from config, reading the key from the configured env var
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ClarabotError::Config(format!(
                    "remote rewriting needs an API key in ${}",
                    config.api_key_env
                ))
            })?;

        Self::new(
            &config.endpoint,
            &config.model,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn user_prompt(text: &str, target_grade: f64) -> String {
        format!(
            "Rewrite the following text for a reading level of about grade {:.0}. \
             Replace non-inclusive terms, prefer short sentences and common words, \
             and return only the rewritten text.\n\n{}",
            target_grade, text
        )
    }
}

#[async_trait]
impl Rewriter for RemoteRewriter {
    fn name(&self) -> &str {
        "remote"
    }

    async fn rewrite(&self, text: &str, target_grade: f64) -> Result<String> {
        let url = format!("{}/chat/completions", self.endpoint);
        let prompt = Self::user_prompt(text, target_grade);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!("Requesting remote rewrite from {} ({})", url, self.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        if !status.is_success() {
            let snippet: String = raw.chars().take(ERROR_SNIPPET_CHARS).collect();
            return Err(ClarabotError::Remote(format!("{} - {}", status, snippet)));
        }

        let payload: serde_json::Value = serde_json::from_str(&raw)?;

        if let Some(error) = payload.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ClarabotError::Remote(message));
        }

        let content = payload
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(str::trim)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ClarabotError::Remote("response contained no text".to_string()));
        }

        Ok(content.to_string())
    }
}
