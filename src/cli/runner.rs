//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat, StrategyKind};
use crate::config::{load_profile, SHARED_MAILBOX_VAR};
use crate::error::{Result, ResultExt};
use crate::http::{HttpCaller, Request, RestCaller, Target};
use crate::nodes::drive::{delete_drive, list_drives, DriveListQuery};
use crate::nodes::outlook::{download_attachments, get_mime_content, list_messages, MessageQuery};
use crate::nodes::ListOptions;
use crate::pagination::{
    ContinuationStrategy, LinkCursor, OffsetSkip, PageToken, PaginatedFetcher, SinglePage,
};
use crate::profiles::list_builtin_info;
use crate::types::Method;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Profiles => self.list_profiles(),
            Commands::Fetch {
                path,
                items,
                strategy,
                limit,
                max_items,
                query,
            } => {
                let caller = self.caller()?;
                let mut base = Request::get(path.clone());
                for (key, value) in query {
                    base = base.query(key.clone(), value.clone());
                }
                let strategy = build_strategy(*strategy, *limit);
                let mut fetcher = PaginatedFetcher::new();
                if let Some(max) = max_items {
                    fetcher = fetcher.with_max_items(*max);
                }
                let records = fetcher
                    .fetch_all(&caller, strategy.as_ref(), base, items)
                    .await?;
                self.emit_records(&records)
            }
            Commands::Call { method, path, body } => {
                let caller = self.caller()?;
                let method: Method = method.parse()?;
                let mut request = Request::new(method, Target::Path(path.clone()));
                if let Some(body) = body {
                    let body = serde_json::from_str(body).context("--body is not valid JSON")?;
                    request = request.json(body);
                }
                let response = caller.call(&request).await?;
                let body = match response.json() {
                    Some(json) => json.clone(),
                    None => json!({ "status": response.status }),
                };
                self.output(&body)
            }
            Commands::Drives {
                all,
                limit,
                q,
                domain_admin,
            } => {
                let caller = self.caller()?;
                let query = DriveListQuery {
                    q: q.clone(),
                    use_domain_admin_access: *domain_admin,
                };
                let drives = list_drives(&caller, list_options(*all, *limit), &query).await?;
                self.emit_records(&drives)
            }
            Commands::DeleteDrive { id } => {
                let caller = self.caller()?;
                let result = delete_drive(&caller, id).await?;
                self.output(&result)
            }
            Commands::Messages {
                all,
                limit,
                folder,
                filter,
                attachments,
            } => {
                let caller = self.caller()?;
                let query = MessageQuery {
                    folder_id: folder.clone(),
                    filter: filter.clone(),
                    select: Vec::new(),
                };
                let messages = list_messages(&caller, list_options(*all, *limit), &query).await?;
                match attachments {
                    Some(prefix) => {
                        let assembled = download_attachments(&caller, messages, prefix).await?;
                        self.emit_records(&assembled)
                    }
                    None => self.emit_records(&messages),
                }
            }
            Commands::Mime {
                id,
                property,
                file_name,
            } => {
                let caller = self.caller()?;
                let payload = get_mime_content(&caller, id, property, file_name.as_deref()).await?;
                let mut binary = Map::new();
                binary.insert(payload.label.clone(), serde_json::to_value(&payload)?);
                self.output(&json!({ "json": { "id": id }, "binary": binary }))
            }
        }
    }

    /// Template variables from `--var` and `--shared-mailbox`
    fn vars(&self) -> Value {
        let mut vars: Map<String, Value> = self
            .cli
            .vars
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        if let Some(mailbox) = &self.cli.shared_mailbox {
            vars.insert(SHARED_MAILBOX_VAR.to_string(), Value::String(mailbox.clone()));
        }
        Value::Object(vars)
    }

    /// Load and resolve the selected profile into a caller
    fn caller(&self) -> Result<RestCaller> {
        let profile = load_profile(&self.cli.profile)?;
        let resolved = profile.resolve(&self.vars())?;
        debug!(
            profile = %resolved.name,
            base_url = %resolved.caller.base_url,
            auth = resolved.auth.kind(),
            "Resolved profile"
        );
        resolved.into_caller()
    }

    fn list_profiles(&self) -> Result<()> {
        let profiles: Vec<Value> = list_builtin_info()
            .into_iter()
            .map(|info| {
                json!({
                    "name": info.name,
                    "description": info.description,
                    "aliases": info.aliases,
                    "env": info.env,
                    "operations": info.operations
                })
            })
            .collect();

        self.output(&json!({ "profiles": profiles }))
    }

    fn emit_records<T: Serialize>(&self, records: &[T]) -> Result<()> {
        for record in records {
            self.output(&serde_json::to_value(record)?)?;
        }
        Ok(())
    }

    fn output(&self, value: &Value) -> Result<()> {
        println!("{}", render(self.cli.format, value)?);
        Ok(())
    }
}

fn render(format: OutputFormat, value: &Value) -> Result<String> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
    };
    Ok(text)
}

fn list_options(all: bool, limit: u64) -> ListOptions {
    if all {
        ListOptions::all()
    } else {
        ListOptions::limit(limit)
    }
}

/// Strategy for `fetch --strategy`
pub fn build_strategy(kind: StrategyKind, limit: u64) -> Box<dyn ContinuationStrategy> {
    match kind {
        StrategyKind::Link => Box::new(LinkCursor::odata()),
        StrategyKind::Offset => Box::new(OffsetSkip::new(limit)),
        StrategyKind::Token => Box::new(PageToken::google().with_page_size("pageSize", limit)),
        StrategyKind::Single => Box::new(SinglePage::new(limit).with_param("$top")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_strategy_names() {
        assert_eq!(build_strategy(StrategyKind::Link, 10).name(), "link_cursor");
        assert_eq!(build_strategy(StrategyKind::Offset, 10).name(), "offset_skip");
        assert_eq!(build_strategy(StrategyKind::Token, 10).name(), "page_token");
        assert_eq!(build_strategy(StrategyKind::Single, 10).name(), "single_page");
    }

    #[test]
    fn test_list_options() {
        assert!(list_options(true, 5).return_all);
        assert_eq!(list_options(false, 5), ListOptions::limit(5));
    }

    #[test]
    fn test_render_formats() {
        let value = json!({"id": 1});
        assert_eq!(render(OutputFormat::Json, &value).unwrap(), r#"{"id":1}"#);
        assert_eq!(
            render(OutputFormat::Pretty, &value).unwrap(),
            "{\n  \"id\": 1\n}"
        );
    }

    #[test]
    fn test_vars_include_shared_mailbox() {
        use clap::Parser;
        let cli = Cli::try_parse_from([
            "pagekit",
            "--var",
            "token=abc",
            "--shared-mailbox",
            "team@contoso.com",
            "profiles",
        ])
        .unwrap();

        let vars = Runner::new(cli).vars();
        assert_eq!(vars["token"], "abc");
        assert_eq!(vars[SHARED_MAILBOX_VAR], "team@contoso.com");
    }
}
