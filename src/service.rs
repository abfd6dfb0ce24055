//! Top-level dispatch for one API: picks the resource named by the first
//! argument, compiles the rest and executes the resulting request.

use crate::engine::compiler;
use crate::engine::executor::HttpExecutor;
use crate::engine::resolver::ResourceGraph;
use crate::error::Error;
use crate::invocation::ExecutionResult;
use std::fmt::Write as _;

pub struct ServiceCommand {
    graph: ResourceGraph,
    executor: HttpExecutor,
}

impl ServiceCommand {
    #[must_use]
    pub const fn new(graph: ResourceGraph, executor: HttpExecutor) -> Self {
        Self { graph, executor }
    }

    /// Runs `args` (`<resource> [flags] <method> ...`) against the API.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown resource (with the resource listing
    /// attached as details), any compile error, or a failed HTTP exchange.
    pub async fn execute<S: AsRef<str>>(&self, args: &[S]) -> Result<ExecutionResult, Error> {
        let Some(first) = args.first().map(AsRef::as_ref) else {
            return Ok(ExecutionResult::output_only(self.help()));
        };
        if matches!(first, "--help" | "-h" | "help") {
            return Ok(ExecutionResult::output_only(self.help()));
        }

        let resource = self
            .graph
            .get_resource(first)
            .map_err(|e| e.with_details(self.help()))?;
        let compiled = compiler::compile(resource, args[1..].iter().map(AsRef::as_ref))?;
        let Some(request) = compiled.request else {
            return Ok(ExecutionResult::output_only(compiled.output));
        };

        let mut result = self
            .executor
            .execute(&self.graph.server_url, &request)
            .await?;
        if !compiled.output.is_empty() {
            result.output = format!("{}{}", compiled.output, result.output);
        }
        Ok(result)
    }

    /// Usage text listing every resource in lexical order
    #[must_use]
    pub fn help(&self) -> String {
        let mut help = format!(
            "Usage: [resource] [method] [flags]\n\nCommand group for {}\n\nAvailable resources:\n",
            self.graph.server_url
        );
        for name in self.graph.names() {
            let _ = writeln!(help, "  - {name}");
        }
        help
    }
}
