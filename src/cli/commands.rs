//! CLI commands and argument parsing

use clap::{Parser, Subcommand};

/// Paginated REST fetches against built-in or custom API profiles
#[derive(Parser, Debug)]
#[command(name = "pagekit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Profile name (built-in) or YAML file
    #[arg(short, long, global = true, default_value = "outlook")]
    pub profile: String,

    /// Template variable (`key=value`), repeatable
    #[arg(long = "var", global = true, value_parser = parse_key_value)]
    pub vars: Vec<(String, String)>,

    /// Use the shared mailbox of this user principal name
    #[arg(long, global = true)]
    pub shared_mailbox: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every page of a list endpoint
    Fetch {
        /// Path under the profile's base URL
        #[arg(long)]
        path: String,

        /// Field holding the items of each page
        #[arg(long, default_value = "value")]
        items: String,

        /// Continuation strategy
        #[arg(long, default_value = "link")]
        strategy: StrategyKind,

        /// Page size (single and offset strategies)
        #[arg(long, default_value = "100")]
        limit: u64,

        /// Stop requesting pages after this many items
        #[arg(long)]
        max_items: Option<usize>,

        /// Query parameter (`key=value`), repeatable
        #[arg(long = "query", value_parser = parse_key_value)]
        query: Vec<(String, String)>,
    },

    /// Issue a single request and print the body
    Call {
        /// HTTP method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Path under the profile's base URL
        #[arg(long)]
        path: String,

        /// Inline JSON body
        #[arg(long)]
        body: Option<String>,
    },

    /// List shared drives
    Drives {
        /// Fetch every page
        #[arg(long)]
        all: bool,

        /// Maximum number of drives
        #[arg(long, default_value = "100")]
        limit: u64,

        /// Search query
        #[arg(long)]
        q: Option<String>,

        /// List as a domain administrator
        #[arg(long)]
        domain_admin: bool,
    },

    /// Delete a shared drive
    DeleteDrive {
        /// Drive id
        id: String,
    },

    /// List mail messages
    Messages {
        /// Fetch every page
        #[arg(long)]
        all: bool,

        /// Maximum number of messages
        #[arg(long, default_value = "50")]
        limit: u64,

        /// Mail folder id
        #[arg(long)]
        folder: Option<String>,

        /// OData filter
        #[arg(long)]
        filter: Option<String>,

        /// Download attachments, labeled with this prefix
        #[arg(long, value_name = "PREFIX")]
        attachments: Option<String>,
    },

    /// Fetch a message in MIME format
    Mime {
        /// Message id
        id: String,

        /// Label of the payload
        #[arg(long, default_value = "data")]
        property: String,

        /// File name without the `.eml` extension
        #[arg(long)]
        file_name: Option<String>,
    },

    /// List built-in profiles
    Profiles,
}

/// Continuation strategy selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StrategyKind {
    /// Follow `@odata.nextLink`
    Link,
    /// `$top`/`$skip`
    Offset,
    /// `nextPageToken` → `pageToken`
    Token,
    /// One page
    Single,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per line
    Json,
    /// Indented JSON
    Pretty,
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}
