use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// The request could not be completed and no response was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Request timeout: {0}")]
    Timeout(String),
    #[error("Connection failed: {0}")]
    Connection(String),
    #[error("Request failed: {0}")]
    Other(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Outgoing request handed to an [`HttpSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    /// JSON body, if any
    pub content: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            content: None,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }
}

/// Response as seen by the client, fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL of the request
    pub url: String,
    pub method: Method,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub content: Bytes,
}

impl HttpResponse {
    pub fn new(
        url: impl Into<String>,
        method: Method,
        status: StatusCode,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            url: url.into(),
            method,
            status,
            headers: HeaderMap::new(),
            content: content.into(),
        }
    }

    /// Decode content as text. Invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Decode content as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.content)
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Headers to include when sending requests
    pub headers: HeaderMap,
    /// Total timeout per request
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Perform TLS certificate validation for HTTPS requests
    pub verify_ssl: bool,
    pub user_agent: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            timeout: None,
            connect_timeout: None,
            verify_ssl: true,
            user_agent: None,
        }
    }
}

/// Transport capability: send one request, receive status and body.
///
/// Implementations must be reusable across sequential calls. Concurrent
/// in-flight requests on one session are only supported if the
/// implementation says so (the reqwest adapter does).
pub trait HttpSession: Send + Sync {
    fn request(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, RequestError>> + Send;

    /// Release held resources.
    fn close(&self) -> impl Future<Output = ()> + Send {
        async {}
    }
}

impl<S: HttpSession> HttpSession for Arc<S> {
    fn request(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, RequestError>> + Send {
        (**self).request(request)
    }

    fn close(&self) -> impl Future<Output = ()> + Send {
        (**self).close()
    }
}
