//! Handler for `aepcli <alias|file|url> ...`.

use crate::cli::Cli;
use crate::config::manager::ConfigManager;
use crate::engine::executor::{parse_header, HttpExecutor};
use crate::engine::resolver;
use crate::error::Error;
use crate::fs::FileSystem;
use crate::invocation::{ExecutionContext, ExecutionResult};
use crate::service::ServiceCommand;
use crate::spec::load_document;

/// Document location, server URL, path prefix and headers for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiTarget {
    pub location: String,
    pub server_url: Option<String>,
    pub path_prefix: String,
    pub headers: Vec<String>,
}

/// Combines the CLI flags with the alias named by `cli.target`, if any.
///
/// Without an alias the target is used as a document path or URL. With one,
/// the alias' document is used, its path prefix applies when none was given,
/// its headers are appended and its server URL is used unless `--server-url`
/// was passed.
pub fn resolve_target<F: FileSystem>(
    cli: &Cli,
    manager: &ConfigManager<F>,
) -> Result<ApiTarget, Error> {
    let mut target = ApiTarget {
        location: cli.target.clone(),
        server_url: cli.server_url.clone().filter(|url| !url.is_empty()),
        path_prefix: cli.path_prefix.clone().unwrap_or_default(),
        headers: cli.headers.clone(),
    };

    let Some(api) = manager.find_api(&cli.target)? else {
        return Ok(target);
    };
    tracing::debug!(alias = %api.name, "using configured API");
    target.location = manager.resolve_openapi_path(&api);
    if target.path_prefix.is_empty() {
        target.path_prefix.clone_from(&api.path_prefix);
    }
    target.headers.extend(api.headers.iter().cloned());
    if target.server_url.is_none() && !api.server_url.is_empty() {
        target.server_url = Some(api.server_url);
    }
    Ok(target)
}

pub async fn execute_api_command<F: FileSystem>(
    cli: &Cli,
    manager: &ConfigManager<F>,
) -> Result<ExecutionResult, Error> {
    let target = resolve_target(cli, manager)?;
    let headers = target
        .headers
        .iter()
        .map(|header| parse_header(header))
        .collect::<Result<Vec<_>, _>>()?;

    let document = load_document(&target.location).await?;
    let graph = resolver::resolve(
        &document,
        target.server_url.as_deref(),
        &target.path_prefix,
    )?;
    tracing::debug!(
        resources = graph.names().count(),
        server_url = %graph.server_url,
        "resolved resource graph"
    );

    let executor = HttpExecutor::new(ExecutionContext {
        headers,
        log_http: cli.log_http,
        dry_run: cli.dry_run,
        ca_cert: cli.ca_cert.clone(),
        insecure: cli.insecure,
    })?;
    ServiceCommand::new(graph, executor).execute(&cli.args).await
}
