use super::http::{HttpRequest, HttpResponse, HttpSession, RequestError, SessionOptions};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, trace};
use url::Url;

/// [`HttpSession`] backed by a pooled `reqwest` client.
///
/// Safe to share between concurrent upload calls.
#[derive(Debug, Clone)]
pub struct ReqwestSession {
    client: Client,
}

impl ReqwestSession {
    pub fn new(options: SessionOptions) -> Result<Self, RequestError> {
        let mut client_builder = ClientBuilder::new()
            .default_headers(options.headers)
            .danger_accept_invalid_certs(!options.verify_ssl);

        if let Some(timeout) = options.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if let Some(connect_timeout) = options.connect_timeout {
            client_builder = client_builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = &options.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        }

        let client = client_builder.build().map_err(|e| {
            RequestError::InvalidRequest(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn convert_error(error: reqwest::Error) -> RequestError {
        if error.is_timeout() {
            RequestError::Timeout(error.to_string())
        } else if error.is_connect() {
            RequestError::Connection(error.to_string())
        } else if error.is_builder() {
            RequestError::InvalidRequest(error.to_string())
        } else {
            RequestError::Other(error.to_string())
        }
    }
}

impl HttpSession for ReqwestSession {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let url = Url::parse(&request.url)
            .map_err(|e| RequestError::InvalidRequest(format!("Invalid URL '{}': {e}", request.url)))?;

        trace!("{} {}", request.method, url);

        let mut request_builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers);

        if let Some(content) = request.content {
            request_builder = request_builder.body(content);
        }

        let response = request_builder.send().await.map_err(Self::convert_error)?;

        let status = response.status();
        let url = response.url().to_string();
        let headers = response.headers().clone();
        let content = response.bytes().await.map_err(Self::convert_error)?;

        debug!(
            "{} {} -> {} ({} bytes)",
            request.method,
            url,
            status.as_u16(),
            content.len()
        );

        Ok(HttpResponse {
            url,
            method: request.method,
            status,
            headers,
            content,
        })
    }
}
