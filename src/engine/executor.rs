use crate::constants;
use crate::error::Error;
use crate::invocation::{CompiledRequest, ExecutionContext, ExecutionResult};
use crate::logging;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PEM_CERTIFICATE_MARKER: &str = "-----BEGIN CERTIFICATE-----";

/// Loads an additional root certificate from a PEM file
fn load_ca_certificate(path: &Path) -> Result<reqwest::Certificate, Error> {
    let shown = path.display().to_string();
    tracing::debug!(path = %shown, "loading custom CA certificate");
    let pem = std::fs::read(path).map_err(|e| Error::ca_cert_unreadable(&shown, &e))?;
    if !String::from_utf8_lossy(&pem).contains(PEM_CERTIFICATE_MARKER) {
        return Err(Error::invalid_ca_cert(&shown, "not valid PEM format"));
    }
    reqwest::Certificate::from_pem(&pem).map_err(|e| Error::invalid_ca_cert(&shown, e))
}

/// Build HTTP client honoring the TLS settings of the context
fn build_http_client(context: &ExecutionContext) -> Result<reqwest::Client, Error> {
    let mut builder = reqwest::Client::builder().timeout(REQUEST_TIMEOUT);
    if context.insecure {
        tracing::debug!("TLS certificate verification disabled (insecure mode)");
        builder = builder.danger_accept_invalid_certs(true);
    } else if let Some(path) = &context.ca_cert {
        builder = builder.add_root_certificate(load_ca_certificate(path)?);
    } else {
        tracing::debug!("using system CA certificates");
    }
    builder
        .build()
        .map_err(|e| Error::request_failed(format!("Failed to create HTTP client: {e}")))
}

/// Parses a `key=value` header argument
///
/// # Errors
///
/// Returns an error if there is no `=` or the key is empty.
pub fn parse_header(header: &str) -> Result<(String, String), Error> {
    let (name, value) = header
        .split_once('=')
        .ok_or_else(|| Error::invalid_header(header))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::invalid_header(header));
    }
    Ok((name.to_string(), value.to_string()))
}

/// Joins the server URL with the request path and query
#[must_use]
pub fn build_url(server_url: &str, request: &CompiledRequest) -> String {
    let mut url = format!(
        "{}/{}",
        server_url.trim_end_matches('/'),
        request.path.trim_start_matches('/')
    );
    if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
        url.push('?');
        url.push_str(query);
    }
    url
}

fn build_headers(method: &Method, extra: &[(String, String)]) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    let content_type = if method == Method::PATCH {
        constants::CONTENT_TYPE_MERGE_PATCH
    } else {
        constants::CONTENT_TYPE_JSON
    };
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    for (name, value) in extra {
        let header_name =
            HeaderName::from_str(name).map_err(|_| Error::invalid_header_value(name))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| Error::invalid_header_value(name))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// Pretty-prints JSON bodies; anything else is returned unchanged
#[must_use]
pub fn format_response_body(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

/// Sends compiled requests to an API server
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: reqwest::Client,
    context: ExecutionContext,
}

impl HttpExecutor {
    /// Builds the executor and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the CA certificate cannot be loaded or the client
    /// cannot be built.
    pub fn new(context: ExecutionContext) -> Result<Self, Error> {
        let client = build_http_client(&context)?;
        Ok(Self { client, context })
    }

    /// Executes `request` against `server_url`.
    ///
    /// With `log_http` the request line and body are prepended to the
    /// output; with `dry_run` nothing is sent and the status code is 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or a header is invalid, or the request
    /// cannot be sent or its response read.
    pub async fn execute(
        &self,
        server_url: &str,
        request: &CompiledRequest,
    ) -> Result<ExecutionResult, Error> {
        let url_text = build_url(server_url, request);
        let url = Url::parse(&url_text).map_err(|_| Error::invalid_url(&url_text))?;
        let headers = build_headers(&request.method, &self.context.headers)?;
        let body_text = request
            .body
            .as_deref()
            .map(|body| String::from_utf8_lossy(body).into_owned());

        let request_log =
            logging::format_request(request.method.as_str(), url.as_str(), body_text.as_deref());
        logging::log_request(
            request.method.as_str(),
            url.as_str(),
            &headers,
            body_text.as_deref(),
        );

        let mut output = String::new();
        if self.context.log_http {
            output.push_str(&request_log);
            output.push('\n');
        }
        if self.context.dry_run {
            tracing::debug!("dry run: not making request");
            return Ok(ExecutionResult::output_only(output));
        }

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::request_failed(format!(
                    "Request timed out after {} seconds",
                    REQUEST_TIMEOUT.as_secs()
                ))
            } else {
                Error::request_failed(e)
            }
        })?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Error::request_failed(format!("unable to read response body: {e}")))?;
        logging::log_response(status, started.elapsed().as_millis(), &text);

        output.push_str(&format_response_body(&text));
        Ok(ExecutionResult {
            output,
            status_code: status,
        })
    }
}
