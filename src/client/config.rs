use reqwest::header::HeaderMap;
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the dashboard server, e.g. https://shmdash.de
    pub url: String,
    pub api_key: String,
    /// Total timeout per request, none by default
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Check TLS certificates
    pub verify_ssl: bool,
    pub user_agent: Option<String>,
    /// Cut record lists into chunks of this size before sending
    pub chunk_size: Option<NonZeroUsize>,
    /// Extra headers sent with every request
    pub headers: HeaderMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "https://shmdash.de".to_string(),
            api_key: String::new(),
            timeout: None,
            connect_timeout: Some(Duration::from_secs(10)),
            verify_ssl: false,
            user_agent: Some(format!("shmdash-client/{}", crate::VERSION)),
            chunk_size: None,
            headers: HeaderMap::new(),
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: NonZeroUsize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
}
