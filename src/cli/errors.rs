//! Error display formatting for the CLI.

use crate::constants;
use crate::error::Error;

/// Prints an error message, either as JSON or user-friendly format.
pub fn print_error_with_json(error: &Error, json_format: bool) {
    if !json_format {
        print_error(error);
        return;
    }
    let json_error = error.to_json();
    let Ok(json_output) = serde_json::to_string_pretty(&json_error) else {
        print_error(error);
        return;
    };
    eprintln!("{json_output}");
}

/// Prints a user-friendly error message with details and suggestions.
pub fn print_error(error: &Error) {
    eprintln!("{}", render_error(error));
}

/// The text [`print_error`] writes to stderr
#[must_use]
pub fn render_error(error: &Error) -> String {
    match error {
        Error::Internal {
            kind,
            message,
            context,
        } => {
            let mut text = format!("{kind}: {message}");
            let Some(ctx) = context else { return text };
            if let Some(suggestion) = &ctx.suggestion {
                text.push_str(&format!("\n\nHint: {suggestion}"));
            }
            if let Some(details) = &ctx.details {
                text.push_str(&format!("\n\n{}", details.trim_end()));
            }
            text
        }
        Error::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => format!(
                "File Not Found\n{io_err}\n\nHint: {}",
                constants::ERR_FILE_NOT_FOUND
            ),
            std::io::ErrorKind::PermissionDenied => format!(
                "Permission Denied\n{io_err}\n\nHint: {}",
                constants::ERR_PERMISSION
            ),
            _ => format!("File System Error\n{io_err}"),
        },
        Error::Network(req_err) => {
            if req_err.is_connect() {
                format!(
                    "Connection Error\n{req_err}\n\nHint: {}",
                    constants::ERR_CONNECTION
                )
            } else if req_err.is_timeout() {
                format!("Timeout Error\n{req_err}\n\nHint: {}", constants::ERR_TIMEOUT)
            } else {
                format!("Network Error\n{req_err}")
            }
        }
        Error::Yaml(yaml_err) => format!("YAML Parsing Error\n{yaml_err}"),
        Error::Json(json_err) => format!("JSON Parsing Error\n{json_err}"),
        Error::Toml(toml_err) => format!("TOML Parsing Error\n{toml_err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_internal_error_with_hint_and_details() {
        let error = Error::resource_not_found("bok", &["book".to_string()], Some("book"))
            .with_details("Available resources:\n  - book\n");
        let text = render_error(&error);
        assert!(text.starts_with("Validation: Resource \"bok\" not found"));
        assert!(text.contains("Hint: Did you mean 'book'?"));
        assert!(text.ends_with("Available resources:\n  - book"));
    }

    #[test]
    fn test_render_io_not_found() {
        let error = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(render_error(&error).starts_with("File Not Found"));
    }
}
