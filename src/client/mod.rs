//! SHM Dash client facade.
//!
//! Owns the transport session and the endpoint URLs, attaches the API key to
//! every request and hands record uploads to the [`BatchTransmitter`].

pub mod config;

pub use config::ClientConfig;

use crate::domain::{Annotation, Attribute, ClientError, Record, Setup, VirtualChannel};
use crate::sender::serialization::{Command, encode_annotation, encode_command, encode_setup};
use crate::sender::{
    BatchTransmitter, HttpRequest, HttpResponse, HttpSession, ReqwestSession, SessionOptions,
    UploadSummary, check_response,
};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};
use url::Url;

pub const API_KEY_HEADER: &str = "UPLOAD-API-KEY";
const API_PATH: &str = "/upload/vjson/v1/";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Endpoints {
    api: String,
    setup: String,
    data: String,
    commands: String,
    annotation: String,
    delete_data: String,
    recreate: String,
}

impl Endpoints {
    fn new(base: &str) -> Result<Self, ClientError> {
        let base: Url = base
            .parse()
            .map_err(|e| ClientError::InvalidConfiguration(format!("Invalid URL '{base}': {e}")))?;
        let api = base
            .join(API_PATH)
            .map_err(|e| ClientError::InvalidConfiguration(format!("Invalid API URL: {e}")))?;

        let join = |path: &str| -> Result<String, ClientError> {
            api.join(path)
                .map(String::from)
                .map_err(|e| ClientError::InvalidConfiguration(format!("Invalid URL path '{path}': {e}")))
        };

        Ok(Self {
            setup: join("setup")?,
            data: join("data")?,
            commands: join("commands")?,
            annotation: join("annotation")?,
            delete_data: join("/dev/timeseriesdata")?,
            recreate: join("/dev/recreate")?,
            api: api.into(),
        })
    }
}

fn request_headers(api_key: &str, extra: &HeaderMap) -> Result<HeaderMap, ClientError> {
    let api_key = HeaderValue::from_str(api_key)
        .map_err(|e| ClientError::InvalidConfiguration(format!("Invalid API key: {e}")))?;

    let mut headers = extra.clone();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(HeaderName::from_static("upload-api-key"), api_key);
    Ok(headers)
}

/// SHM Dash client, generic over the transport.
///
/// All calls are sequential within themselves; a `Client` backed by
/// [`ReqwestSession`] can be shared between tasks.
pub struct Client<S = ReqwestSession> {
    session: S,
    endpoints: Endpoints,
    headers: HeaderMap,
    chunk_size: Option<NonZeroUsize>,
}

impl Client<ReqwestSession> {
    pub fn new(url: &str, api_key: &str) -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::new(url, api_key))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let session = ReqwestSession::new(SessionOptions {
            headers: HeaderMap::new(),
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
            verify_ssl: config.verify_ssl,
            user_agent: config.user_agent.clone(),
        })?;

        let mut client = Self::build(&config.url, &config.api_key, &config.headers, session)?;
        client.chunk_size = config.chunk_size;
        Ok(client)
    }
}

impl<S: HttpSession> Client<S> {
    /// Create a client on top of any [`HttpSession`].
    pub fn with_session(url: &str, api_key: &str, session: S) -> Result<Self, ClientError> {
        Self::build(url, api_key, &HeaderMap::new(), session)
    }

    fn build(url: &str, api_key: &str, extra_headers: &HeaderMap, session: S) -> Result<Self, ClientError> {
        info!("Initialize SHM Dash client: {}", url);

        Ok(Self {
            endpoints: Endpoints::new(url)?,
            headers: request_headers(api_key, extra_headers)?,
            session,
            chunk_size: None,
        })
    }

    /// Cut record lists into chunks of at most `chunk_size` records before sending.
    pub fn with_chunk_size(mut self, chunk_size: Option<NonZeroUsize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Base URL of the upload API.
    pub fn api_url(&self) -> &str {
        &self.endpoints.api
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        content: Option<String>,
    ) -> Result<HttpResponse, ClientError> {
        let mut request = HttpRequest::new(method, url).with_headers(self.headers.clone());
        if let Some(content) = content {
            request = request.with_content(content);
        }

        let response = self.session.request(request).await?;
        check_response(&response)?;
        Ok(response)
    }

    pub async fn get_setup(&self) -> Result<Setup, ClientError> {
        let response = self.send(Method::GET, &self.endpoints.setup, None).await?;
        if response.content.is_empty() {
            return Ok(Setup::default());
        }
        Ok(response.json()?)
    }

    pub async fn get_attributes(&self) -> Result<Vec<Attribute>, ClientError> {
        Ok(self.get_setup().await?.attributes)
    }

    pub async fn get_virtual_channels(&self) -> Result<Vec<VirtualChannel>, ClientError> {
        Ok(self.get_setup().await?.virtual_channels)
    }

    /// Upload the schema.
    ///
    /// Without a remote schema the full setup is posted at once. Otherwise
    /// only missing attributes and virtual channels are added, one command
    /// each; existing entries are left untouched.
    pub async fn setup(
        &self,
        attributes: &[Attribute],
        virtual_channels: &[VirtualChannel],
    ) -> Result<(), ClientError> {
        let existing = self.get_setup().await?;

        if existing.is_empty() {
            info!("Upload setup");
            let setup = Setup::new(attributes.to_vec(), virtual_channels.to_vec());
            self.send(Method::POST, &self.endpoints.setup, Some(encode_setup(&setup)?))
                .await?;
            return Ok(());
        }

        for attribute in attributes {
            if existing.contains_attribute(&attribute.identifier) {
                debug!("Attribute {} already exists", attribute.identifier);
            } else {
                self.add_attribute(attribute).await?;
            }
        }
        for virtual_channel in virtual_channels {
            if existing.contains_virtual_channel(&virtual_channel.identifier) {
                debug!("Virtual channel {} already exists", virtual_channel.identifier);
            } else {
                self.add_virtual_channel(virtual_channel).await?;
            }
        }

        Ok(())
    }

    pub async fn add_attribute(&self, attribute: &Attribute) -> Result<(), ClientError> {
        info!("Add attribute {}", attribute.identifier);
        let body = encode_command(Command::add_attribute(attribute))?;
        self.send(Method::POST, &self.endpoints.commands, Some(body))
            .await?;
        Ok(())
    }

    pub async fn add_virtual_channel(
        &self,
        virtual_channel: &VirtualChannel,
    ) -> Result<(), ClientError> {
        info!("Add virtual channel {}", virtual_channel.identifier);
        let body = encode_command(Command::add_virtual_channel(virtual_channel))?;
        self.send(Method::POST, &self.endpoints.commands, Some(body))
            .await?;
        Ok(())
    }

    /// Append attributes to an existing virtual channel.
    pub async fn add_virtual_channel_attributes(
        &self,
        virtual_channel_id: &str,
        attribute_ids: &[String],
    ) -> Result<(), ClientError> {
        info!(
            "Add attributes {:?} to virtual channel {}",
            attribute_ids, virtual_channel_id
        );
        let body = encode_command(Command::add_virtual_channel_attributes(
            virtual_channel_id,
            attribute_ids,
        ))?;
        self.send(Method::POST, &self.endpoints.commands, Some(body))
            .await?;
        Ok(())
    }

    /// Upload records to a virtual channel.
    ///
    /// Batches rejected with 413 are halved until they pass; a single record
    /// that is still too large fails the call. Duplicate timestamps and
    /// channel errors reported by the server are logged and returned in the
    /// summary, not raised.
    pub async fn upload_data(
        &self,
        virtual_channel_id: &str,
        records: &[Record],
    ) -> Result<UploadSummary, ClientError> {
        BatchTransmitter::new(&self.session, &self.endpoints.data, &self.headers)
            .with_chunk_size(self.chunk_size)
            .upload(virtual_channel_id, records)
            .await
    }

    pub async fn upload_annotation(&self, annotation: &Annotation) -> Result<(), ClientError> {
        debug!(
            "Upload {:?} annotation: {}",
            annotation.severity, annotation.description
        );
        let body = encode_annotation(annotation)?;
        self.send(Method::POST, &self.endpoints.annotation, Some(body))
            .await?;
        Ok(())
    }

    /// Delete all time-series data of this API key.
    pub async fn delete_data(&self) -> Result<(), ClientError> {
        warn!("Delete all data");
        self.send(Method::DELETE, &self.endpoints.delete_data, None)
            .await?;
        Ok(())
    }

    /// Delete all time-series data and setup information of this API key.
    pub async fn recreate(&self) -> Result<(), ClientError> {
        warn!("Delete all data and setup information");
        self.send(Method::GET, &self.endpoints.recreate, None).await?;
        Ok(())
    }

    pub async fn close(&self) {
        debug!("Close SHM Dash HTTP client session");
        self.session.close().await;
    }
}
