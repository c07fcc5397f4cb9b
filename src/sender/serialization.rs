//! Wire encoding of records, commands and annotations.
//!
//! Field names and value shapes are part of the service contract.

use crate::domain::{Annotation, Attribute, Record, Setup, Severity, VirtualChannel};
use chrono::{DateTime, Utc};
use serde::ser::{SerializeSeq, Serializer};
use serde::Serialize;

/// Render a timestamp as ISO-8601 UTC with a literal `Z` suffix.
///
/// The fraction is printed with microsecond precision and omitted when the
/// microsecond part is zero: `2024-01-01T11:11:11.111111Z`, `2024-01-01T12:00:00Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    // Leap seconds report subsecond values above one second
    let micros = timestamp.timestamp_subsec_micros() % 1_000_000;
    let seconds = timestamp.format("%Y-%m-%dT%H:%M:%S");

    if micros == 0 {
        format!("{seconds}Z")
    } else {
        format!("{seconds}.{micros:06}Z")
    }
}

/// Duplicate-key policy of a data upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictPolicy {
    /// Records whose timestamp already exists are dropped by the server
    Ignore,
}

/// One positional row: `[channelId, timestamp, ...values]`.
#[derive(Debug, Clone, Copy)]
pub struct DataRow<'a> {
    pub channel_id: &'a str,
    pub record: &'a Record,
}

impl Serialize for DataRow<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2 + self.record.values.len()))?;
        seq.serialize_element(self.channel_id)?;
        seq.serialize_element(&format_timestamp(&self.record.timestamp))?;
        for value in &self.record.values {
            seq.serialize_element(value)?;
        }
        seq.end()
    }
}

/// Body of the `data` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DataUpload<'a> {
    pub conflict: ConflictPolicy,
    pub data: Vec<DataRow<'a>>,
}

impl<'a> DataUpload<'a> {
    pub fn new(channel_id: &'a str, records: &'a [Record]) -> Self {
        Self {
            conflict: ConflictPolicy::Ignore,
            data: records
                .iter()
                .map(|record| DataRow { channel_id, record })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AddAttribute<'a> {
    #[serde(rename = "attributeId")]
    pub attribute_id: &'a str,
    #[serde(flatten)]
    pub attribute: &'a Attribute,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddVirtualChannel<'a> {
    #[serde(rename = "virtualChannelId")]
    pub virtual_channel_id: &'a str,
    #[serde(flatten)]
    pub virtual_channel: &'a VirtualChannel,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddVirtualChannelAttributes<'a> {
    #[serde(rename = "virtualChannelId")]
    pub virtual_channel_id: &'a str,
    pub attributes: &'a [String],
}

/// Schema command of the `commands` endpoint, tagged by `cmdName`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "cmdName", rename_all = "camelCase")]
pub enum Command<'a> {
    AddAttribute(AddAttribute<'a>),
    AddVirtualChannel(AddVirtualChannel<'a>),
    AddVirtualChannelAttributes(AddVirtualChannelAttributes<'a>),
}

impl<'a> Command<'a> {
    pub fn add_attribute(attribute: &'a Attribute) -> Self {
        Command::AddAttribute(AddAttribute {
            attribute_id: &attribute.identifier,
            attribute,
        })
    }

    pub fn add_virtual_channel(virtual_channel: &'a VirtualChannel) -> Self {
        Command::AddVirtualChannel(AddVirtualChannel {
            virtual_channel_id: &virtual_channel.identifier,
            virtual_channel,
        })
    }

    pub fn add_virtual_channel_attributes(
        virtual_channel_id: &'a str,
        attributes: &'a [String],
    ) -> Self {
        Command::AddVirtualChannelAttributes(AddVirtualChannelAttributes {
            virtual_channel_id,
            attributes,
        })
    }
}

/// Body of the `commands` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CommandBatch<'a> {
    pub commands: Vec<Command<'a>>,
}

impl<'a> CommandBatch<'a> {
    pub fn single(command: Command<'a>) -> Self {
        Self {
            commands: vec![command],
        }
    }
}

/// Body of the `annotation` endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationBody<'a> {
    pub date: String,
    pub severity: Severity,
    pub description: &'a str,
    pub send_email: bool,
    pub confirmation_needed: bool,
}

impl<'a> From<&'a Annotation> for AnnotationBody<'a> {
    fn from(annotation: &'a Annotation) -> Self {
        Self {
            date: format_timestamp(&annotation.timestamp),
            severity: annotation.severity,
            description: &annotation.description,
            send_email: annotation.send_email,
            confirmation_needed: annotation.confirmation_needed,
        }
    }
}

pub fn encode_data(channel_id: &str, records: &[Record]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&DataUpload::new(channel_id, records))
}

pub fn encode_command(command: Command<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&CommandBatch::single(command))
}

pub fn encode_setup(setup: &Setup) -> Result<String, serde_json::Error> {
    serde_json::to_string(setup)
}

pub fn encode_annotation(annotation: &Annotation) -> Result<String, serde_json::Error> {
    serde_json::to_string(&AnnotationBody::from(annotation))
}
