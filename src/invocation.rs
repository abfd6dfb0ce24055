//! CLI-agnostic invocation model for the request compiler.
//!
//! These types decouple request compilation from clap. A [`ResourceCall`]
//! is extracted from parsed arguments once, then handed by value to
//! [`crate::engine::compiler::compile_request`], which is pure. The
//! executor consumes the resulting [`CompiledRequest`] together with an
//! [`ExecutionContext`] and returns an [`ExecutionResult`].

use crate::constants;
use reqwest::Method;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A typed value bound to one field flag
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    /// Array items are passed through as strings
    Array(Vec<String>),
    Json(Value),
}

impl FieldValue {
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::Number((*i).into()),
            Self::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Array(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
            Self::Json(value) => value.clone(),
        }
    }
}

/// Which operation of a resource is invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodCall {
    Create,
    Get,
    Update,
    Delete,
    List,
    /// Custom method name, without the leading `:`
    Custom(String),
}

impl MethodCall {
    /// Parses a subcommand name (`create`, `get`, `:archive`, ...)
    #[must_use]
    pub fn from_command(name: &str) -> Option<Self> {
        if let Some(custom) = name.strip_prefix(constants::CUSTOM_METHOD_PREFIX) {
            return Some(Self::Custom(custom.to_string()));
        }
        match name {
            constants::CMD_CREATE => Some(Self::Create),
            constants::CMD_GET => Some(Self::Get),
            constants::CMD_UPDATE => Some(Self::Update),
            constants::CMD_DELETE => Some(Self::Delete),
            constants::CMD_LIST => Some(Self::List),
            _ => None,
        }
    }
}

/// Everything one resource invocation asked for, fully extracted from argv.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceCall {
    /// Singular name of the target resource
    pub resource: String,
    /// Parent placeholder values, in path order
    pub parents: Vec<String>,
    pub method: MethodCall,
    /// Positional id, when the method takes one
    pub id: Option<String>,
    /// Explicitly set field flags only
    pub fields: BTreeMap<String, FieldValue>,
    /// Whole-payload override read from `--@data`
    pub data: Option<Map<String, Value>>,
}

impl ResourceCall {
    #[must_use]
    pub fn new(resource: impl Into<String>, method: MethodCall) -> Self {
        Self {
            resource: resource.into(),
            parents: Vec::new(),
            method,
            id: None,
            fields: BTreeMap::new(),
            data: None,
        }
    }

    /// JSON payload assembled from the override or the set fields
    #[must_use]
    pub fn payload(&self) -> Value {
        match &self.data {
            Some(data) => Value::Object(data.clone()),
            None => Value::Object(
                self.fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

/// A request relative to the server URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRequest {
    pub method: Method,
    /// Path without a leading slash, parents already substituted
    pub path: String,
    /// Encoded query string without the leading `?`
    pub query: Option<String>,
    pub body: Option<Vec<u8>>,
}

/// Outcome of compiling one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compiled {
    /// `None` when the invocation only asked for help
    pub request: Option<CompiledRequest>,
    /// Help or diagnostic text
    pub output: String,
}

/// Execution-time settings orthogonal to the request itself.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    /// Extra headers applied after the content type
    pub headers: Vec<(String, String)>,
    /// Print the request before sending it
    pub log_http: bool,
    /// Stop before sending the request
    pub dry_run: bool,
    /// PEM file with an additional root certificate
    pub ca_cert: Option<PathBuf>,
    /// Skip TLS certificate verification
    pub insecure: bool,
}

/// What the service hands back to the CLI layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub output: String,
    /// HTTP status of the response, 0 when no exchange happened
    pub status_code: u16,
}

impl ExecutionResult {
    #[must_use]
    pub fn output_only(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            status_code: 0,
        }
    }

    /// True when a response was received with a status outside 2xx
    #[must_use]
    pub fn is_http_error(&self) -> bool {
        self.status_code != 0 && !(200..300).contains(&self.status_code)
    }
}
