use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad category of an [`Error::Internal`] failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The `OpenAPI` document itself is unusable (dangling refs, no server, ...)
    Document,
    /// An invocation could not be compiled into a request
    Validation,
    /// A user-supplied file could not be read or parsed
    Input,
    /// Configuration file or alias problems
    Config,
    /// The HTTP transport could not be set up or used
    Network,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "Document",
            Self::Validation => "Validation",
            Self::Input => "Input",
            Self::Config => "Config",
            Self::Network => "Network",
        };
        f.write_str(name)
    }
}

/// Extra information attached to an internal error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorContext {
    pub details: Option<String>,
    pub suggestion: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub fn suggestion(suggestion: impl Into<String>) -> Self {
        Self {
            details: None,
            suggestion: Some(suggestion.into()),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{kind}: {message}")]
    Internal {
        kind: ErrorKind,
        message: String,
        context: Option<ErrorContext>,
    },
}

/// JSON representation of an error for structured output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonError {
    pub error_type: String,
    pub message: String,
    pub context: Option<String>,
}

impl Error {
    fn internal(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Internal {
            kind,
            message: message.into(),
            context: None,
        }
    }

    fn internal_with_hint(
        kind: ErrorKind,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Internal {
            kind,
            message: message.into(),
            context: Some(ErrorContext::suggestion(suggestion)),
        }
    }

    /// Returns the kind of an internal error, `None` for wrapped foreign errors.
    #[must_use]
    pub const fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Internal { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Attaches extra detail text, shown after the message
    #[must_use]
    pub fn with_details(self, details: impl Into<String>) -> Self {
        match self {
            Self::Internal {
                kind,
                message,
                context,
            } => {
                let mut context = context.unwrap_or_default();
                context.details = Some(details.into());
                Self::Internal {
                    kind,
                    message,
                    context: Some(context),
                }
            }
            other => other,
        }
    }

    // Document errors

    pub fn schema_not_found(reference: &str) -> Self {
        Self::internal(
            ErrorKind::Document,
            format!("schema \"{reference}\" not found"),
        )
    }

    pub fn circular_reference(reference: &str) -> Self {
        Self::internal(
            ErrorKind::Document,
            format!("circular reference detected: \"{reference}\" is part of a reference cycle"),
        )
    }

    pub fn no_server_url() -> Self {
        Self::internal_with_hint(
            ErrorKind::Document,
            "no servers found in the OpenAPI definition. Cannot find a server to send a request to",
            "Pass --server-url or configure server_url for this API alias.",
        )
    }

    pub fn parent_not_found(resource: &str, parent: &str) -> Self {
        Self::internal(
            ErrorKind::Document,
            format!("resource \"{resource}\" parent \"{parent}\" not found"),
        )
    }

    pub fn circular_parent(resource: &str) -> Self {
        Self::internal(
            ErrorKind::Document,
            format!("resource \"{resource}\" is its own ancestor"),
        )
    }

    pub fn invalid_document(reason: impl Into<String>) -> Self {
        Self::internal_with_hint(
            ErrorKind::Document,
            reason,
            "Check that the OpenAPI document is valid JSON or YAML.",
        )
    }

    // Validation errors

    pub fn resource_not_found(name: &str, available: &[String], suggestion: Option<&str>) -> Self {
        let message = format!(
            "Resource \"{name}\" not found. Resources available: [{}]",
            available.join(", ")
        );
        match suggestion {
            Some(candidate) => Self::internal_with_hint(
                ErrorKind::Validation,
                message,
                format!("Did you mean '{candidate}'?"),
            ),
            None => Self::internal(ErrorKind::Validation, message),
        }
    }

    pub fn missing_required_inputs(resource: &str, flags: &[String]) -> Self {
        Self::internal(
            ErrorKind::Validation,
            format!(
                "missing required flag(s) for {resource}: {}",
                flags
                    .iter()
                    .map(|f| format!("--{f}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        )
    }

    pub fn conflicting_inputs(flags: &[String]) -> Self {
        Self::internal_with_hint(
            ErrorKind::Validation,
            format!(
                "--@data cannot be combined with individual field flags: {}",
                flags
                    .iter()
                    .map(|f| format!("--{f}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            "Put every field in the data file, or drop --@data and use individual flags.",
        )
    }

    pub fn array_without_items(field: &str) -> Self {
        Self::internal(
            ErrorKind::Validation,
            format!("items is required for array type, not found for field {field}"),
        )
    }

    pub fn invalid_arguments(resource: &str, reason: impl fmt::Display) -> Self {
        Self::internal_with_hint(
            ErrorKind::Validation,
            format!("invalid arguments for {resource}: {reason}"),
            format!("Use '{resource} --help' to see the available commands and flags."),
        )
    }

    // Input errors

    pub fn empty_data_path() -> Self {
        Self::internal(ErrorKind::Input, "filename cannot be empty")
    }

    pub fn data_file_unreadable(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::internal_with_hint(
                ErrorKind::Input,
                format!("unable to read file '{path}': no such file or directory"),
                "Check that the file path is correct and the file exists.",
            ),
            std::io::ErrorKind::PermissionDenied => Self::internal_with_hint(
                ErrorKind::Input,
                format!("unable to read file '{path}': permission denied"),
                "Check file permissions or run with appropriate privileges.",
            ),
            _ => Self::internal(ErrorKind::Input, format!("unable to read file '{path}': {err}")),
        }
    }

    pub fn invalid_data_json(path: &str, err: &serde_json::Error) -> Self {
        let rendered = err.to_string();
        let reason = rendered
            .rsplit_once(" at line ")
            .map_or(rendered.as_str(), |(reason, _)| reason);
        Self::internal(
            ErrorKind::Input,
            format!(
                "invalid JSON in '{path}': {reason} at line {}, column {}",
                err.line(),
                err.column()
            ),
        )
    }

    pub fn data_not_object(path: &str) -> Self {
        Self::internal(
            ErrorKind::Input,
            format!("invalid JSON in '{path}': expected a JSON object at the top level"),
        )
    }

    pub fn ca_cert_unreadable(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::internal_with_hint(
                ErrorKind::Input,
                format!("Failed to read CA certificate from {path}: file does not exist"),
                "Verify the file path is correct and that the file is readable.",
            ),
            std::io::ErrorKind::PermissionDenied => Self::internal_with_hint(
                ErrorKind::Input,
                format!("Failed to read CA certificate from {path}: permission denied"),
                format!("Check file permissions with: ls -l {path}"),
            ),
            _ => Self::internal(
                ErrorKind::Input,
                format!("Failed to read CA certificate from {path}: {err}"),
            ),
        }
    }

    pub fn invalid_ca_cert(path: &str, reason: impl fmt::Display) -> Self {
        Self::internal_with_hint(
            ErrorKind::Input,
            format!("Failed to parse CA certificate from {path}: {reason}"),
            format!("Use 'openssl x509 -in {path} -text -noout' to verify the certificate."),
        )
    }

    // Config errors

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::internal(ErrorKind::Config, reason)
    }

    pub fn api_exists(name: &str) -> Self {
        Self::internal_with_hint(
            ErrorKind::Config,
            format!("API with name '{name}' already exists"),
            "Pass --overwrite to replace the existing configuration.",
        )
    }

    pub fn api_not_found(name: &str) -> Self {
        Self::internal_with_hint(
            ErrorKind::Config,
            format!("No API configuration found with name '{name}'"),
            "Use 'aepcli core config list' to see configured APIs.",
        )
    }

    pub fn invalid_header(header: &str) -> Self {
        Self::internal_with_hint(
            ErrorKind::Config,
            format!("invalid header format: {header}"),
            "Headers must be given as key=value.",
        )
    }

    pub fn home_directory_not_found() -> Self {
        Self::internal(ErrorKind::Config, "unable to determine the home directory")
    }

    // Network errors

    pub fn request_failed(reason: impl fmt::Display) -> Self {
        Self::internal(
            ErrorKind::Network,
            format!("unable to execute request: {reason}"),
        )
    }

    pub fn invalid_url(url: &str) -> Self {
        Self::internal(ErrorKind::Network, format!("unable to create url: {url}"))
    }

    pub fn invalid_header_value(name: &str) -> Self {
        Self::internal(
            ErrorKind::Network,
            format!("header '{name}' is not a valid HTTP header"),
        )
    }

    /// Convert error to JSON representation for structured output
    #[must_use]
    pub fn to_json(&self) -> JsonError {
        let (error_type, message, context) = match self {
            Self::Internal {
                kind,
                message,
                context,
            } => (
                kind.to_string(),
                message.clone(),
                context.as_ref().and_then(|c| c.suggestion.clone()),
            ),
            Self::Io(io_err) => {
                let context = match io_err.kind() {
                    std::io::ErrorKind::NotFound => {
                        Some("Check that the file path is correct and the file exists.")
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        Some("Check file permissions or run with appropriate privileges.")
                    }
                    _ => None,
                };
                (
                    "FileSystem".to_string(),
                    io_err.to_string(),
                    context.map(str::to_string),
                )
            }
            Self::Network(req_err) => {
                let context = if req_err.is_connect() {
                    Some("Check that the API server is running and accessible.")
                } else if req_err.is_timeout() {
                    Some("The API server may be slow or unresponsive. Try again later.")
                } else {
                    None
                };
                (
                    "Network".to_string(),
                    req_err.to_string(),
                    context.map(str::to_string),
                )
            }
            Self::Yaml(yaml_err) => (
                "YAMLParsing".to_string(),
                yaml_err.to_string(),
                Some("Check that your OpenAPI document is valid YAML syntax.".to_string()),
            ),
            Self::Json(json_err) => (
                "JSONParsing".to_string(),
                json_err.to_string(),
                Some("Check that your OpenAPI document or response contains valid JSON.".to_string()),
            ),
            Self::Toml(toml_err) => (
                "TOMLParsing".to_string(),
                toml_err.to_string(),
                Some("Check that your configuration file is valid TOML syntax.".to_string()),
            ),
        };

        JsonError {
            error_type,
            message,
            context,
        }
    }
}
