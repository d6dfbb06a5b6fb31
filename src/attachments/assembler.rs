//! Per-record attachment download

use super::types::{AssembledRecord, AttachmentRef, BinaryPayload};
use crate::error::{Error, Result};
use crate::http::{HttpCaller, Request};
use crate::pagination::{LinkCursor, PaginatedFetcher};
use crate::template::{self, TemplateContext};
use serde_json::Value;
use tracing::{debug, info};

/// Default route listing a message's attachments
pub const DEFAULT_LIST_ROUTE: &str = "/messages/{{ record.id }}/attachments";

/// Default route returning one attachment's raw content
pub const DEFAULT_CONTENT_ROUTE: &str =
    "/messages/{{ record.id }}/attachments/{{ attachment.id }}/$value";

/// Downloads the attachments of parent records and attaches them as labeled
/// binary payloads.
///
/// Records are processed in order, one at a time, and attachments within a
/// record one at a time. The first failure aborts the whole run.
#[derive(Debug, Clone)]
pub struct AttachmentAssembler {
    /// Route template for the attachment list
    pub list_route: String,
    /// Route template for one attachment's content
    pub content_route: String,
    /// Items field of the attachment list
    pub items_key: String,
    /// Record field flagging that attachments exist
    pub has_attachments_field: String,
}

impl Default for AttachmentAssembler {
    fn default() -> Self {
        Self {
            list_route: DEFAULT_LIST_ROUTE.to_string(),
            content_route: DEFAULT_CONTENT_ROUTE.to_string(),
            items_key: "value".to_string(),
            has_attachments_field: "hasAttachments".to_string(),
        }
    }
}

impl AttachmentAssembler {
    /// Assembler for the mail API routes
    pub fn new() -> Self {
        Self::default()
    }

    /// Use different route templates
    #[must_use]
    pub fn with_routes(
        mut self,
        list_route: impl Into<String>,
        content_route: impl Into<String>,
    ) -> Self {
        self.list_route = list_route.into();
        self.content_route = content_route.into();
        self
    }

    /// Download attachments for every flagged record.
    ///
    /// Payloads are labeled `{label_prefix}{index}` with the 0-based position
    /// in the server's attachment list. Records that are not flagged, or for
    /// which nothing was downloaded, carry no binary collection.
    pub async fn assemble(
        &self,
        caller: &dyn HttpCaller,
        records: Vec<Value>,
        label_prefix: &str,
    ) -> Result<Vec<AssembledRecord>> {
        let mut assembled = Vec::with_capacity(records.len());
        let mut downloaded = 0_usize;

        for record in records {
            if !self.has_attachments(&record) {
                assembled.push(AssembledRecord::json_only(record));
                continue;
            }

            let payloads = self.download(caller, &record, label_prefix).await?;
            downloaded += payloads.len();
            let binary = if payloads.is_empty() { None } else { Some(payloads) };
            assembled.push(AssembledRecord { json: record, binary });
        }

        info!(
            records = assembled.len(),
            attachments = downloaded,
            "Attachment assembly complete"
        );
        Ok(assembled)
    }

    fn has_attachments(&self, record: &Value) -> bool {
        record.get(&self.has_attachments_field) == Some(&Value::Bool(true))
    }

    async fn download(
        &self,
        caller: &dyn HttpCaller,
        record: &Value,
        label_prefix: &str,
    ) -> Result<Vec<BinaryPayload>> {
        let ctx = TemplateContext::for_record(record);
        let list_path = template::render(&self.list_route, &ctx)?;

        let strategy = LinkCursor::odata();
        let listed = PaginatedFetcher::new()
            .fetch_all(caller, &strategy, Request::get(list_path), &self.items_key)
            .await?;

        let mut payloads = Vec::with_capacity(listed.len());
        for (index, item) in listed.iter().enumerate() {
            let attachment: AttachmentRef = serde_json::from_value(item.clone()).map_err(|e| {
                Error::protocol(format!("malformed attachment at position {index}: {e}"))
            })?;

            let item_ctx = ctx.clone().with_attachment(item);
            let content_path = template::render(&self.content_route, &item_ctx)?;
            let response = caller.call(&Request::get(content_path).binary()).await?;
            let bytes = response
                .bytes()
                .cloned()
                .ok_or_else(|| Error::protocol("attachment content was not returned as bytes"))?;

            debug!(
                attachment = %attachment.id,
                size = bytes.len(),
                "Downloaded attachment"
            );

            payloads.push(BinaryPayload::new(
                format!("{label_prefix}{index}"),
                bytes,
                attachment.name.clone(),
                &[attachment.content_type.as_deref(), response.header("content-type")],
            ));
        }
        Ok(payloads)
    }
}
