use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{ChatRequest, ChatResponse, LoanTimelineRequest, LoanTimelineResponse};
use url::Url;

/// The two remote endpoints the session talks to.
#[async_trait]
pub trait AdvisorBackend: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
    async fn loan_timeline(&self, request: LoanTimelineRequest) -> Result<LoanTimelineResponse>;
}

pub struct HttpAdvisorBackend {
    http: Client,
    base_url: String,
}

impl HttpAdvisorBackend {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("failed to build HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AdvisorBackend for HttpAdvisorBackend {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let response = self
            .http
            .post(format!("{}/chat", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }

    async fn loan_timeline(&self, request: LoanTimelineRequest) -> Result<LoanTimelineResponse> {
        let response = self
            .http
            .post(format!("{}/loan-calculator", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }
}

/// Validates an http(s) base URL and strips trailing slashes so endpoint
/// paths can be appended directly.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid API base URL '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "API base URL must use http or https, got '{}'",
            parsed.scheme()
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
