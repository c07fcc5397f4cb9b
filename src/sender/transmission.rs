use super::http::{HttpRequest, HttpResponse, HttpSession};
use super::response::check_response;
use super::serialization::encode_data;
use crate::domain::{ClientError, Record};
use futures::future::BoxFuture;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use tracing::{debug, warn};

/// Channel-level problem reported inside a successful upload response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelError {
    pub virtual_channel_id: String,
    pub message: String,
}

/// Outcome of one `upload` call.
///
/// Everything counted here has also been logged; the summary exists so
/// callers can react without parsing logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    /// Requests issued, including rejected ones
    pub requests: usize,
    /// Records carried by requests the server accepted
    pub records_sent: usize,
    pub records_accepted: usize,
    /// Records dropped by the server because their timestamp already existed
    pub records_ignored: usize,
    /// Number of times a batch was halved after a 413
    pub splits: usize,
    pub channel_errors: Vec<ChannelError>,
}

impl UploadSummary {
    pub fn is_complete(&self) -> bool {
        self.records_ignored == 0 && self.channel_errors.is_empty()
    }
}

// Expected response:
// {
//     "0": {"success": 2},
//     "1": {"error": "Key (abs_date_time)=(2018-09-27 15:51:14) already exists."}
// }
#[derive(Debug, Default, Deserialize)]
struct ChannelResult {
    #[serde(default)]
    success: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

/// Sends records of one virtual channel and halves batches the server rejects as too large.
///
/// Halves are resolved strictly in order: the left half, including all of
/// its own splits, completes before the right half is sent. A single record
/// that is still too large fails the whole call.
pub struct BatchTransmitter<'a, S> {
    session: &'a S,
    url: &'a str,
    headers: &'a HeaderMap,
    chunk_size: Option<NonZeroUsize>,
}

impl<'a, S: HttpSession> BatchTransmitter<'a, S> {
    pub fn new(session: &'a S, url: &'a str, headers: &'a HeaderMap) -> Self {
        Self {
            session,
            url,
            headers,
            chunk_size: None,
        }
    }

    /// Cut batches into chunks of at most `chunk_size` records before sending.
    pub fn with_chunk_size(mut self, chunk_size: Option<NonZeroUsize>) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub async fn upload(
        &self,
        virtual_channel_id: &str,
        records: &[Record],
    ) -> Result<UploadSummary, ClientError> {
        let mut summary = UploadSummary::default();

        if records.is_empty() {
            debug!("No records to upload to virtual channel {}", virtual_channel_id);
            return Ok(summary);
        }

        debug!(
            "Upload {} records to virtual channel {}",
            records.len(),
            virtual_channel_id
        );

        let chunk_size = self.chunk_size.map_or(records.len(), NonZeroUsize::get);
        for chunk in records.chunks(chunk_size) {
            self.send_bisecting(virtual_channel_id, chunk, &mut summary)
                .await?;
        }

        Ok(summary)
    }

    fn send_bisecting<'b>(
        &'b self,
        virtual_channel_id: &'b str,
        records: &'b [Record],
        summary: &'b mut UploadSummary,
    ) -> BoxFuture<'b, Result<(), ClientError>> {
        Box::pin(async move {
            match self.send_chunk(virtual_channel_id, records, summary).await {
                Err(ClientError::Response(e)) if e.is_payload_too_large() && records.len() > 1 => {
                    let (left, right) = records.split_at(records.len() / 2);
                    warn!(
                        "{}. Retry with halves of {} and {} records",
                        e,
                        left.len(),
                        right.len()
                    );
                    summary.splits += 1;
                    self.send_bisecting(virtual_channel_id, left, summary)
                        .await?;
                    self.send_bisecting(virtual_channel_id, right, summary)
                        .await
                }
                other => other,
            }
        })
    }

    async fn send_chunk(
        &self,
        virtual_channel_id: &str,
        records: &[Record],
        summary: &mut UploadSummary,
    ) -> Result<(), ClientError> {
        let body = encode_data(virtual_channel_id, records)?;
        let request = HttpRequest::new(Method::POST, self.url)
            .with_headers(self.headers.clone())
            .with_content(body);

        summary.requests += 1;
        let response = self.session.request(request).await?;
        check_response(&response)?;

        summary.records_sent += records.len();
        record_results(&response, records.len(), summary);
        Ok(())
    }
}

fn record_results(response: &HttpResponse, sent: usize, summary: &mut UploadSummary) {
    if response.content.is_empty() {
        summary.records_accepted += sent;
        return;
    }

    let results: BTreeMap<String, ChannelResult> = match response.json() {
        Ok(results) => results,
        Err(e) => {
            warn!("Unexpected upload response, assuming {} records accepted: {}", sent, e);
            summary.records_accepted += sent;
            return;
        }
    };

    if results.is_empty() {
        summary.records_accepted += sent;
        return;
    }

    for (identifier, result) in results {
        let accepted = result.success.map_or(sent, |n| (n as usize).min(sent));
        let ignored = sent - accepted;
        if ignored > 0 {
            warn!(
                "Ignored {}/{} uploads to virtual channel {}: Timestamps already exist",
                ignored, sent, identifier
            );
        }
        summary.records_accepted += accepted;
        summary.records_ignored += ignored;

        if let Some(message) = result.error {
            warn!(
                "Error uploading to virtual channel {}, ignore data: {}",
                identifier, message
            );
            summary.channel_errors.push(ChannelError {
                virtual_channel_id: identifier,
                message,
            });
        }
    }
}
