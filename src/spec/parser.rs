use super::OpenApiDocument;
use crate::error::Error;
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Maximum accepted size of a document fetched over HTTP
const MAX_RESPONSE_SIZE: u64 = 10 * 1024 * 1024;
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Flags some generators emit as 0/1 instead of false/true. Only mapping
/// keys are rewritten: a YAML key must start its line (optionally after a
/// list dash), a JSON key must follow `{` or `,`. Text inside description
/// strings is left alone.
static YAML_NUMERIC_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*(?:-[ \t]+)?)(readOnly|required):[ \t]*([01])[ \t]*$")
        .expect("Regex pattern is hardcoded and valid")
});
static JSON_NUMERIC_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([{,]\s*)"(readOnly|required)"\s*:\s*([01])\b"#)
        .expect("Regex pattern is hardcoded and valid")
});

fn numeric_flag_to_bool(caps: &Captures<'_>, json: bool) -> String {
    let value = if &caps[3] == "1" { "true" } else { "false" };
    if json {
        format!(r#"{}"{}":{value}"#, &caps[1], &caps[2])
    } else {
        format!("{}{}: {value}", &caps[1], &caps[2])
    }
}

fn preprocess_for_compatibility(content: &str, is_json: bool) -> String {
    let fixed = JSON_NUMERIC_FLAG.replace_all(content, |caps: &Captures<'_>| {
        numeric_flag_to_bool(caps, true)
    });
    if is_json {
        return fixed.into_owned();
    }
    YAML_NUMERIC_FLAG
        .replace_all(&fixed, |caps: &Captures<'_>| numeric_flag_to_bool(caps, false))
        .into_owned()
}

/// Parses an `OpenAPI` document written in JSON or YAML.
///
/// Content starting with `{` is read as JSON first, anything else as YAML
/// first; the other format is tried when the first one fails.
///
/// # Errors
///
/// Returns the error of the first-choice format when neither parses.
pub fn parse_document(content: &str) -> Result<OpenApiDocument, Error> {
    let is_json = content.trim_start().starts_with('{');
    let preprocessed = preprocess_for_compatibility(content, is_json);

    if is_json {
        serde_json::from_str(&preprocessed).or_else(|json_err| {
            serde_yaml::from_str(&preprocessed).map_err(|_| Error::Json(json_err))
        })
    } else {
        serde_yaml::from_str(&preprocessed).or_else(|yaml_err| {
            serde_json::from_str(&preprocessed).map_err(|_| Error::Yaml(yaml_err))
        })
    }
}

/// Determines if the input string is a URL (starts with http:// or https://)
#[must_use]
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Loads a document from a local path or an http(s) URL.
///
/// # Errors
///
/// Returns an error if the document cannot be read, fetched or parsed.
pub async fn load_document(location: &str) -> Result<OpenApiDocument, Error> {
    let content = if is_url(location) {
        tracing::debug!(url = location, "fetching OpenAPI document");
        fetch_document(location).await?
    } else {
        let path = Path::new(location);
        tracing::debug!(path = %path.display(), "reading OpenAPI document");
        std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_document(format!(
                "unable to read OpenAPI document '{location}': {e}"
            ))
        })?
    };
    parse_document(&content)
}

async fn fetch_document(url: &str) -> Result<String, Error> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| Error::request_failed(format!("Failed to create HTTP client: {e}")))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            Error::request_failed(format!(
                "Request timed out after {} seconds",
                FETCH_TIMEOUT.as_secs()
            ))
        } else if e.is_connect() {
            Error::request_failed(format!("Failed to connect to {url}: {e}"))
        } else {
            Error::request_failed(e)
        }
    })?;

    if !response.status().is_success() {
        return Err(Error::request_failed(format!(
            "HTTP {} from {url}",
            response.status()
        )));
    }

    if let Some(content_length) = response.content_length() {
        if content_length > MAX_RESPONSE_SIZE {
            return Err(Error::request_failed(format!(
                "Response too large: {content_length} bytes (max {MAX_RESPONSE_SIZE} bytes)"
            )));
        }
    }

    let bytes = response.bytes().await?;
    if bytes.len() > usize::try_from(MAX_RESPONSE_SIZE).unwrap_or(usize::MAX) {
        return Err(Error::request_failed(format!(
            "Response too large: {} bytes (max {MAX_RESPONSE_SIZE} bytes)",
            bytes.len()
        )));
    }

    String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::request_failed(format!("Invalid UTF-8 in response: {e}")))
}
