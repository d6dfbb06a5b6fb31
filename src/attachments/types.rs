//! Attachment and binary payload types

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Mime type used when neither the attachment nor the response names one
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// One entry of a record's attachment list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    /// Attachment id
    pub id: String,
    /// File name as uploaded
    #[serde(default)]
    pub name: Option<String>,
    /// Declared mime type
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Downloaded file content with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryPayload {
    /// Key of the payload in its record's binary collection
    #[serde(skip)]
    pub label: String,
    /// Raw content, serialized as base64
    #[serde(rename = "data", serialize_with = "serialize_base64")]
    pub bytes: Bytes,
    /// File name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Mime type
    pub mime_type: String,
    /// Extension taken from the file name, without the dot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    /// Size in bytes
    pub file_size: u64,
}

impl BinaryPayload {
    /// Wrap downloaded bytes.
    ///
    /// The first mime type given wins; with none, `application/octet-stream`.
    pub fn new(
        label: impl Into<String>,
        bytes: Bytes,
        file_name: Option<String>,
        mime_candidates: &[Option<&str>],
    ) -> Self {
        let mime_type = mime_candidates
            .iter()
            .flatten()
            .map(|m| m.trim())
            .find(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();
        let file_extension = file_name.as_deref().and_then(extension_of);

        Self {
            label: label.into(),
            file_size: bytes.len() as u64,
            bytes,
            file_name,
            mime_type,
            file_extension,
        }
    }
}

fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

fn serialize_base64<S: Serializer>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&STANDARD.encode(bytes))
}

/// A record with the binary payloads downloaded for it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledRecord {
    /// The record as returned by the API
    pub json: Value,
    /// Payloads in server order, serialized as a label-keyed map; absent
    /// when nothing was downloaded
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_labeled"
    )]
    pub binary: Option<Vec<BinaryPayload>>,
}

impl AssembledRecord {
    /// A record with no binary collection
    pub fn json_only(json: Value) -> Self {
        Self { json, binary: None }
    }

    /// Number of payloads attached
    pub fn binary_count(&self) -> usize {
        self.binary.as_ref().map_or(0, Vec::len)
    }

    /// Payload stored under `label`
    pub fn payload(&self, label: &str) -> Option<&BinaryPayload> {
        self.binary.as_ref()?.iter().find(|p| p.label == label)
    }
}

fn serialize_labeled<S: Serializer>(
    payloads: &Option<Vec<BinaryPayload>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let payloads = payloads.as_deref().unwrap_or_default();
    let mut map = serializer.serialize_map(Some(payloads.len()))?;
    for payload in payloads {
        map.serialize_entry(&payload.label, payload)?;
    }
    map.end()
}
