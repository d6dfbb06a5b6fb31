//! Shared drives

use super::{list, ListOptions};
use crate::error::Result;
use crate::http::{HttpCaller, Request};
use crate::pagination::PageToken;
use crate::types::OptionStringExt;
use serde_json::{json, Value};
use tracing::info;

/// Shared drives collection
pub const DRIVES_PATH: &str = "/drive/v3/drives";

/// Filters for listing shared drives
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriveListQuery {
    /// Search query (`q`)
    pub q: Option<String>,
    /// List every drive of the domain as an administrator
    pub use_domain_admin_access: bool,
}

impl DriveListQuery {
    fn apply(&self, mut request: Request) -> Request {
        if let Some(q) = self.q.clone().none_if_empty() {
            request = request.query("q", q);
        }
        if self.use_domain_admin_access {
            request = request.query("useDomainAdminAccess", true);
        }
        request
    }
}

/// List shared drives
pub async fn list_drives(
    caller: &dyn HttpCaller,
    options: ListOptions,
    query: &DriveListQuery,
) -> Result<Vec<Value>> {
    let base = query.apply(Request::get(DRIVES_PATH));
    let drives = list(caller, options, &PageToken::google(), "pageSize", base, "drives").await?;
    info!(count = drives.len(), "Listed shared drives");
    Ok(drives)
}

/// Delete a shared drive
pub async fn delete_drive(caller: &dyn HttpCaller, drive_id: &str) -> Result<Value> {
    caller
        .call(&Request::delete(format!("{DRIVES_PATH}/{drive_id}")))
        .await?;
    info!(drive = drive_id, "Deleted shared drive");
    Ok(json!({ "success": true }))
}
