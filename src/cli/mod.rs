pub mod commands;
pub mod errors;
pub mod tracing_init;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(
    name = "aepcli",
    author,
    version,
    about = "aepcli: a resource-oriented CLI for AEP-compliant APIs",
    long_about = "aepcli reads an OpenAPI document, discovers the resources it exposes\n\
                  and turns them into commands.\n\n\
                  Examples:\n  \
                  aepcli core config add bookstore --openapi-path ./openapi.json\n  \
                  aepcli bookstore book --publisher=p1 list\n  \
                  aepcli https://example.com/openapi.json publisher get p1\n  \
                  aepcli --dry-run --log-http bookstore publisher create p2 --description=x"
)]
pub struct Cli {
    /// Extra request header as key=value (repeatable)
    #[arg(long = "header", value_name = "KEY=VALUE")]
    pub headers: Vec<String>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info, help = "Log level")]
    pub log_level: LogLevel,

    #[arg(long, help = "Print the HTTP request before sending it")]
    pub log_http: bool,

    #[arg(long, help = "Build the request without sending it")]
    pub dry_run: bool,

    /// Prefix stripped from every document path before resources are inferred
    #[arg(long, value_name = "PREFIX")]
    pub path_prefix: Option<String>,

    /// Server URL to use instead of the one declared by the document
    #[arg(long, value_name = "URL")]
    pub server_url: Option<String>,

    /// Configuration file to read aliases from
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Skip TLS certificate verification")]
    pub insecure: bool,

    /// PEM file with an additional trusted root certificate
    #[arg(long, value_name = "FILE", conflicts_with = "insecure")]
    pub ca_cert: Option<PathBuf>,

    #[arg(long, help = "Output errors in JSON format")]
    pub json_errors: bool,

    /// API alias, path or URL of an `OpenAPI` document, or `core`
    #[arg(value_name = "API", allow_hyphen_values = true)]
    pub target: String,

    /// Resource, method and flags, parsed against the API's resources
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// `aepcli core ...`
#[derive(Parser, Debug)]
#[command(name = "core", about = "Manage aepcli itself")]
pub struct CoreCli {
    #[command(subcommand)]
    pub command: CoreCommands,
}

#[derive(Subcommand, Debug)]
pub enum CoreCommands {
    /// Manage API aliases
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Work with `OpenAPI` documents
    Openapi {
        #[command(subcommand)]
        command: OpenApiCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum OpenApiCommands {
    /// Rewrite a document with an `x-aep-resource` annotation per resource
    #[command(long_about = "Resolve the resources of a document and write them back as an\n\
                      OpenAPI 3.1 document whose resource schemas carry x-aep-resource.\n\n\
                      Example:\n  \
                      aepcli core openapi convert -i ./swagger.yaml -o ./openapi.json")]
    Convert {
        /// Path or URL of the source document
        #[arg(short, long, value_name = "PATH")]
        input: String,
        /// File to write; standard output when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Prefix stripped from document paths
        #[arg(long, value_name = "PREFIX", default_value = "")]
        path_prefix: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Add an API alias
    #[command(long_about = "Register a named API.\n\n\
                      Relative document paths are resolved against the directory\n\
                      of the configuration file.\n\n\
                      Example:\n  \
                      aepcli core config add bookstore --openapi-path ./openapi.json --header Authorization='Bearer x'")]
    Add {
        /// Name of the alias
        name: String,
        /// Path or URL of the `OpenAPI` document
        #[arg(long, value_name = "PATH")]
        openapi_path: String,
        /// Header sent with every request, as key=value (repeatable)
        #[arg(long = "header", value_name = "KEY=VALUE")]
        headers: Vec<String>,
        /// Server URL overriding the document's
        #[arg(long, value_name = "URL", default_value = "")]
        server_url: String,
        /// Prefix stripped from document paths
        #[arg(long, value_name = "PREFIX", default_value = "")]
        path_prefix: String,
        /// Replace an existing alias with the same name
        #[arg(long)]
        overwrite: bool,
    },
    /// Show one API alias
    Get {
        /// Name of the alias
        name: String,
    },
    /// List all API aliases
    List,
}

/// Installs the process-wide rustls crypto provider used by reqwest.
pub fn install_crypto_provider() {
    #[cfg(not(windows))]
    let provider = rustls::crypto::ring::default_provider();
    #[cfg(windows)]
    let provider = rustls::crypto::aws_lc_rs::default_provider();
    // Already installed is fine.
    let _ = provider.install_default();
}
