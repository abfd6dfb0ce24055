//! Handlers for `aepcli core config *` subcommands.

use crate::cli::commands::openapi::run_openapi_command;
use crate::cli::{ConfigCommands, CoreCli, CoreCommands};
use crate::config::manager::ConfigManager;
use crate::config::models::ApiAlias;
use crate::constants;
use crate::error::Error;
use crate::fs::FileSystem;
use clap::Parser;
use std::fmt::Write as _;

/// Parses `args` (everything after `core`) and runs the command, returning
/// the text to print.
///
/// Help requests and usage errors are rendered by clap into the returned
/// text or error respectively.
pub async fn run_core_command<F: FileSystem>(
    args: &[String],
    manager: &ConfigManager<F>,
) -> Result<String, Error> {
    let argv = std::iter::once(constants::CORE_COMMAND.to_string()).chain(args.iter().cloned());
    let core = match CoreCli::try_parse_from(argv) {
        Ok(core) => core,
        Err(err) if !err.use_stderr() => return Ok(err.render().to_string()),
        Err(err) => {
            let rendered = err.render().to_string();
            let reason = rendered.lines().next().unwrap_or_default();
            return Err(Error::invalid_arguments(
                constants::CORE_COMMAND,
                reason.trim_start_matches("error: "),
            ));
        }
    };

    match core.command {
        CoreCommands::Config { command } => run_config_command(command, manager),
        CoreCommands::Openapi { command } => run_openapi_command(command).await,
    }
}

fn run_config_command<F: FileSystem>(
    command: ConfigCommands,
    manager: &ConfigManager<F>,
) -> Result<String, Error> {
    match command {
        ConfigCommands::Add {
            name,
            openapi_path,
            headers,
            server_url,
            path_prefix,
            overwrite,
        } => {
            let api = ApiAlias {
                name: name.clone(),
                openapi_path,
                server_url,
                headers,
                path_prefix,
            };
            manager.add_api(api, overwrite)?;
            tracing::debug!(name = %name, file = %manager.config_file().display(), "alias saved");
            Ok(format!("Core API configuration '{name}' added successfully\n"))
        }
        ConfigCommands::Get { name } => {
            let api = manager.get_api(&name)?;
            Ok(describe_api(&api))
        }
        ConfigCommands::List => {
            let apis = manager.list_apis()?;
            if apis.is_empty() {
                return Ok("No API configurations found\n".to_string());
            }
            Ok(apis
                .iter()
                .map(|api| format!("{}\n", describe_api(api)))
                .collect())
        }
    }
}

fn describe_api(api: &ApiAlias) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "Name: {}", api.name);
    let _ = writeln!(text, "OpenAPI Path: {}", api.openapi_path);
    let _ = writeln!(text, "Server URL: {}", api.server_url);
    let _ = writeln!(text, "Headers: [{}]", api.headers.join(" "));
    let _ = writeln!(text, "Path Prefix: {}", api.path_prefix);
    text
}
