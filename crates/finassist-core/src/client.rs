use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::Config;
use crate::error::{ChartError, ExchangeError};
use crate::exchange::ChatBackend;

#[derive(Serialize)]
struct ChatRequest<'a> {
    user_input: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    reply: String,
}

/// HTTP client for the assistant's `/chat` and chart endpoints
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
    chart_url: String,
}

impl AssistantClient {
    pub fn new(base_url: &str, chart_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            chart_url: chart_url.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url, &config.chart_url)
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }

    pub fn chart_url(&self) -> &str {
        &self.chart_url
    }

    pub async fn query(&self, user_input: &str) -> Result<String, ExchangeError> {
        let url = self.chat_url();
        debug!(%url, "posting chat request");

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { user_input })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status { status, body });
        }

        // Decode separately so a bad body is reported as malformed, not as a transport error
        let body = response.text().await?;
        let chat_response: ChatResponse = serde_json::from_str(&body)?;
        Ok(chat_response.reply)
    }

    /// Download the chart image to `path`, returning the number of bytes written
    pub async fn download_chart(&self, path: &Path) -> Result<u64, ChartError> {
        debug!(url = %self.chart_url, path = %path.display(), "downloading chart");

        let response = self.client.get(&self.chart_url).send().await?;

        if !response.status().is_success() {
            return Err(ChartError::Status(response.status()));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut bytes_written = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bytes_written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(bytes_written)
    }
}

#[async_trait]
impl ChatBackend for AssistantClient {
    async fn send(&self, user_input: &str) -> Result<String, ExchangeError> {
        self.query(user_input).await
    }
}
