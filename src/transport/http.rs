use super::TransportError;
use crate::error_code::ErrorClass;
use crate::types::ProviderResponse;
use crate::Result;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Proxy;
use std::env;
use std::time::Duration;

/// One outbound exchange.
#[derive(Debug, Clone, Copy)]
pub struct TransportRequest<'a> {
    pub endpoint: &'a str,
    pub api_key: &'a str,
    pub payload: &'a serde_json::Value,
    pub request_id: &'a str,
}

/// Thin wrapper over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    app_url: Option<String>,
    app_title: Option<String>,
}

impl HttpTransport {
    /// Build a transport with env-overridable defaults:
    ///
    /// - `OPENROUTER_HTTP_TIMEOUT_SECS` (default 30)
    /// - `OPENROUTER_HTTP_POOL_MAX_IDLE_PER_HOST` (default 8)
    /// - `OPENROUTER_PROXY_URL`
    /// - `OPENROUTER_APP_URL` / `OPENROUTER_APP_TITLE` (sent as `HTTP-Referer` / `X-Title`)
    pub fn new() -> Result<Self> {
        let timeout = env::var("OPENROUTER_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));
        Self::with_timeout(timeout)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("OPENROUTER_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(90)));

        if let Ok(proxy_url) = env::var("OPENROUTER_PROXY_URL") {
            match Proxy::all(&proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!(error = %e, "ignoring invalid OPENROUTER_PROXY_URL"),
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            app_url: env::var("OPENROUTER_APP_URL").ok().filter(|s| !s.is_empty()),
            app_title: env::var("OPENROUTER_APP_TITLE").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Attribution headers OpenRouter uses to credit the calling application.
    pub fn with_attribution(
        mut self,
        app_url: Option<String>,
        app_title: Option<String>,
    ) -> Self {
        if app_url.is_some() {
            self.app_url = app_url;
        }
        if app_title.is_some() {
            self.app_title = app_title;
        }
        self
    }

    fn headers(&self, request_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(v) = HeaderValue::from_str(request_id) {
            headers.insert("x-request-id", v);
        }
        if let Some(v) = self.app_url.as_deref().and_then(|u| HeaderValue::from_str(u).ok()) {
            headers.insert("HTTP-Referer", v);
        }
        if let Some(v) = self
            .app_title
            .as_deref()
            .and_then(|t| HeaderValue::from_str(t).ok())
        {
            headers.insert("X-Title", v);
        }
        headers
    }

    /// POST the payload and parse the answer.
    ///
    /// Non-2xx answers become [`TransportError::Status`] carrying whatever error
    /// body could be recovered. A 2xx body that is not JSON is
    /// [`TransportError::MalformedResponse`].
    pub async fn send(&self, request: TransportRequest<'_>) -> Result<ProviderResponse> {
        let response = self
            .client
            .post(request.endpoint)
            .headers(self.headers(request.request_id))
            .bearer_auth(request.api_key)
            .json(request.payload)
            .send()
            .await
            .map_err(TransportError::Http)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(TransportError::Http)?;

        if !status.is_success() {
            let body = serde_json::from_slice::<serde_json::Value>(&bytes)
                .unwrap_or_else(|_| serde_json::json!({}));
            let class = ErrorClass::classify(status.as_u16(), &body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
                class,
            }
            .into());
        }

        let value = serde_json::from_slice::<serde_json::Value>(&bytes).map_err(|e| {
            TransportError::MalformedResponse {
                status: status.as_u16(),
                details: e.to_string(),
            }
        })?;

        Ok(ProviderResponse::from_value(value))
    }
}
