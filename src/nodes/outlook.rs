//! Mail messages and attachments

use super::{list, ListOptions};
use crate::attachments::{AssembledRecord, AttachmentAssembler, BinaryPayload};
use crate::error::{Error, Result};
use crate::http::{HttpCaller, Request};
use crate::pagination::{LinkCursor, OffsetSkip, PaginatedFetcher};
use crate::types::OptionStringExt;
use serde_json::Value;
use tracing::info;

/// Filters for listing messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    /// Restrict to one mail folder
    pub folder_id: Option<String>,
    /// OData `$filter`
    pub filter: Option<String>,
    /// OData `$select`
    pub select: Vec<String>,
}

impl MessageQuery {
    fn request(&self) -> Request {
        let path = match self.folder_id.clone().none_if_empty() {
            Some(folder) => format!("/mailFolders/{folder}/messages"),
            None => "/messages".to_string(),
        };

        let mut request = Request::get(path);
        if let Some(filter) = self.filter.clone().none_if_empty() {
            request = request.query("$filter", filter);
        }
        if !self.select.is_empty() {
            request = request.query("$select", self.select.join(","));
        }
        request
    }
}

/// List messages, following `@odata.nextLink` when returning all
pub async fn list_messages(
    caller: &dyn HttpCaller,
    options: ListOptions,
    query: &MessageQuery,
) -> Result<Vec<Value>> {
    let messages = list(
        caller,
        options,
        &LinkCursor::odata(),
        "$top",
        query.request(),
        "value",
    )
    .await?;
    info!(count = messages.len(), "Listed messages");
    Ok(messages)
}

/// List every message of a folder with `$top`/`$skip` paging.
///
/// Paging stops only on an empty page. A short page does not end the listing.
pub async fn list_folder_messages_skip(
    caller: &dyn HttpCaller,
    folder_id: &str,
    query: &MessageQuery,
) -> Result<Vec<Value>> {
    let query = MessageQuery {
        folder_id: Some(folder_id.to_string()),
        ..query.clone()
    };
    PaginatedFetcher::new()
        .fetch_all(
            caller,
            &OffsetSkip::default().until_empty(),
            query.request(),
            "value",
        )
        .await
}

/// Download the attachments of each message, labeled `{prefix}{index}`
pub async fn download_attachments(
    caller: &dyn HttpCaller,
    messages: Vec<Value>,
    prefix: &str,
) -> Result<Vec<AssembledRecord>> {
    AttachmentAssembler::new()
        .assemble(caller, messages, prefix)
        .await
}

/// Fetch a message in MIME format as `{output_file_name or id}.eml`.
///
/// The payload is labeled with `binary_property`.
pub async fn get_mime_content(
    caller: &dyn HttpCaller,
    message_id: &str,
    binary_property: &str,
    output_file_name: Option<&str>,
) -> Result<BinaryPayload> {
    if message_id.is_empty() {
        return Err(Error::config("message id must not be empty"));
    }

    let request = Request::get(format!("/messages/{message_id}/$value")).binary();
    let response = caller.call(&request).await?;
    let bytes = response
        .bytes()
        .cloned()
        .ok_or_else(|| Error::protocol("MIME content was not returned as bytes"))?;

    let stem = output_file_name.filter(|n| !n.is_empty()).unwrap_or(message_id);
    Ok(BinaryPayload::new(
        binary_property,
        bytes,
        Some(format!("{stem}.eml")),
        &[response.header("content-type")],
    ))
}
