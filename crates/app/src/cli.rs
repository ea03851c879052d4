//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use relay_domain::{HttpMethod, QueryParam, RequestTemplate};

#[derive(Parser, Debug)]
#[command(name = "relay", author, version, about, long_about = None)]
/// Send API requests through a proxy, with per-environment variables
pub struct Cli {
    /// Settings file (defaults to <config dir>/relay/settings.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Proxy base URL, overrides settings
    #[arg(long, global = true, value_name = "URL")]
    pub proxy_url: Option<String>,

    /// Data directory for environments and offline history, overrides settings
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Environment management commands
    #[command(subcommand)]
    #[command(visible_alias = "e")]
    Env(EnvCommands),
    /// Resolve and send a request
    Send {
        #[command(flatten)]
        request: RequestArgs,
        /// Also file the request under this collection
        #[arg(long, value_name = "ID")]
        collection: Option<String>,
    },
    /// Print the resolved request without sending it
    Preview {
        #[command(flatten)]
        request: RequestArgs,
    },
    /// Save the request as authored to history without sending it
    Save {
        #[command(flatten)]
        request: RequestArgs,
        /// Also file the request under this collection
        #[arg(long, value_name = "ID")]
        collection: Option<String>,
    },
    /// Request history; lists it, newest first, without a subcommand
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },
    /// Collection commands
    #[command(subcommand)]
    Collections(CollectionCommands),
}

#[derive(Subcommand, Debug)]
pub enum EnvCommands {
    /// List environments, marking the current one
    #[command(visible_alias = "ls")]
    List,
    /// Show an environment (the current one by default)
    Show {
        /// Environment id
        id: Option<String>,
    },
    /// Create an environment and make it current
    #[command(visible_alias = "new")]
    Create {
        /// Display name
        name: String,
        /// Variable to set; repeatable
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
    },
    /// Rename an environment or change its variables
    Update {
        /// Environment id
        id: String,
        /// New display name
        #[arg(long)]
        name: Option<String>,
        /// Variable to set; repeatable
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// Variable to remove; repeatable
        #[arg(long = "unset", value_name = "KEY")]
        unset: Vec<String>,
    },
    /// Delete an environment
    #[command(visible_alias = "rm")]
    Delete {
        /// Environment id
        id: String,
    },
    /// Make an environment current
    Use {
        /// Environment id
        id: String,
    },
    /// Re-read environments from disk and list them
    Refresh,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List request history, newest first
    #[command(visible_alias = "ls")]
    List,
    /// Print a history entry as an editable request template
    Show {
        /// History record id
        id: String,
    },
    /// Send a history entry again
    Resend {
        /// History record id
        id: String,
        /// Resolve against this environment instead of the current one
        #[arg(long = "env", value_name = "ID")]
        environment: Option<String>,
        /// Also file the request under this collection
        #[arg(long, value_name = "ID")]
        collection: Option<String>,
    },
    /// Delete a history entry
    #[command(visible_alias = "rm")]
    Delete {
        /// History record id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CollectionCommands {
    /// List collections
    #[command(visible_alias = "ls")]
    List,
    /// Create a collection
    Create {
        /// Collection name
        name: String,
    },
    /// List the requests saved in a collection
    Items {
        /// Collection id
        id: String,
    },
    /// Print a collection item as an editable request template
    Item {
        /// Collection id
        collection_id: String,
        /// Item id
        item_id: String,
    },
    /// Delete a collection and everything saved in it
    #[command(visible_alias = "rm")]
    Delete {
        /// Collection id
        id: String,
    },
    /// Remove one saved request from its collection
    RemoveItem {
        /// Item id
        id: String,
    },
}

/// A request template as given on the command line.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Request URL; may contain {{placeholders}}
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: HttpMethod,

    /// Query parameter appended to the URL; repeatable
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<QueryParam>,

    /// Header line; repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub header_lines: Vec<String>,

    /// Headers as a JSON object or newline-separated lines
    #[arg(long = "headers", value_name = "TEXT", conflicts_with = "header_lines")]
    pub headers_text: Option<String>,

    /// JSON body (ignored for GET)
    #[arg(short = 'd', long, value_name = "JSON")]
    pub body: Option<String>,

    /// Resolve against this environment instead of the current one
    #[arg(long = "env", value_name = "ID")]
    pub environment: Option<String>,
}

impl RequestArgs {
    /// Builds the unresolved template.
    #[must_use]
    pub fn template(&self) -> RequestTemplate {
        let headers = self
            .headers_text
            .clone()
            .unwrap_or_else(|| self.header_lines.join("\n"));

        let mut template = RequestTemplate::new(self.method, &self.url)
            .with_headers(headers)
            .with_body(self.body.clone().unwrap_or_default());
        template.params.clone_from(&self.params);
        template
    }
}

/// Parses `KEY=VALUE`, splitting on the first `=`.
fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
