//! Handlers for `aepcli core openapi *` subcommands.

use crate::cli::OpenApiCommands;
use crate::engine::{converter, resolver};
use crate::error::Error;
use crate::spec::load_document;
use std::path::Path;

pub async fn run_openapi_command(command: OpenApiCommands) -> Result<String, Error> {
    match command {
        OpenApiCommands::Convert {
            input,
            output,
            path_prefix,
        } => convert_document(&input, output.as_deref(), &path_prefix).await,
    }
}

/// Converts the document at `input`. With `output` the result is written
/// there and nothing is returned for printing.
pub async fn convert_document(
    input: &str,
    output: Option<&Path>,
    path_prefix: &str,
) -> Result<String, Error> {
    let document = load_document(input).await?;
    let graph = resolver::resolve(&document, None, path_prefix)?;
    let converted = converter::convert(&graph, &document)?;

    let Some(path) = output else {
        return Ok(converted);
    };
    std::fs::write(path, format!("{converted}\n"))?;
    tracing::info!(
        output = %path.display(),
        resources = graph.names().count(),
        "wrote converted document"
    );
    Ok(String::new())
}
