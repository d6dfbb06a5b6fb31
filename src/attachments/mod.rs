//! Attachment assembly
//!
//! Turns records that reference binary attachments into records carrying
//! the downloaded content as labeled payloads.

mod assembler;
mod types;

pub use assembler::{AttachmentAssembler, DEFAULT_CONTENT_ROUTE, DEFAULT_LIST_ROUTE};
pub use types::{AssembledRecord, AttachmentRef, BinaryPayload, DEFAULT_MIME_TYPE};
