//! Client configuration

use shared::ProviderId;

use crate::{ClientError, ClientResult, HttpClient};

/// Backend used when `TRAVELWISH_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Client configuration for talking to the Travelwish backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "https://api.travelwish.example")
    pub base_url: String,

    /// Event-stream URL; derived from `base_url` when unset
    pub ws_url: Option<String>,

    /// Request timeout in seconds. `None` leaves requests unbounded.
    pub timeout: Option<u64>,

    /// Provider whose bookings the dashboard shows
    pub provider_id: Option<ProviderId>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ws_url: None,
            timeout: None,
            provider_id: None,
        }
    }

    /// Load configuration from the process environment
    ///
    /// | variable                       | field         |
    /// |--------------------------------|---------------|
    /// | `TRAVELWISH_API_URL`           | `base_url`    |
    /// | `TRAVELWISH_WS_URL`            | `ws_url`      |
    /// | `TRAVELWISH_HTTP_TIMEOUT_SECS` | `timeout`     |
    /// | `TRAVELWISH_PROVIDER_ID`       | `provider_id` |
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut config = Self::new(var("TRAVELWISH_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()));
        config.ws_url = var("TRAVELWISH_WS_URL");
        config.provider_id = var("TRAVELWISH_PROVIDER_ID").map(ProviderId::new);
        config.timeout = var("TRAVELWISH_HTTP_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ClientError::Config(format!("TRAVELWISH_HTTP_TIMEOUT_SECS={raw}: {e}"))
                })
            })
            .transpose()?;

        Ok(config)
    }

    /// Set the event-stream URL
    pub fn with_ws_url(mut self, url: impl Into<String>) -> Self {
        self.ws_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    /// Set the provider identity
    pub fn with_provider_id(mut self, provider_id: impl Into<ProviderId>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }

    /// Event-stream URL: explicit `ws_url`, else `base_url` with a ws scheme and `/ws`.
    pub fn ws_url(&self) -> String {
        if let Some(ref url) = self.ws_url {
            return url.clone();
        }
        let base = self
            .base_url
            .trim_end_matches('/')
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{base}/ws")
    }

    /// Provider identity, required by provider-scoped pages
    pub fn require_provider_id(&self) -> ClientResult<&ProviderId> {
        self.provider_id
            .as_ref()
            .ok_or_else(|| ClientError::Config("TRAVELWISH_PROVIDER_ID is not set".to_string()))
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<HttpClient> {
        HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
