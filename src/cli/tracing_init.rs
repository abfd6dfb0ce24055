//! Diagnostic logging setup for aepcli.
//!
//! Command output goes to stdout; everything emitted through `tracing`
//! goes to stderr, or to the file named by `AEPCLI_LOG_FILE`.

use crate::cli::LogLevel;
use crate::constants;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Shape of emitted log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parses `AEPCLI_LOG_FORMAT`. `None` means the value was not recognized.
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    fn from_env() -> Self {
        let Ok(raw) = std::env::var(constants::ENV_AEPCLI_LOG_FORMAT) else {
            return Self::Text;
        };
        Self::parse(&raw).unwrap_or_else(|| {
            // The subscriber does not exist yet.
            eprintln!(
                "Warning: unrecognized {} '{raw}', expected 'json' or 'text'",
                constants::ENV_AEPCLI_LOG_FORMAT
            );
            Self::Text
        })
    }
}

/// Log sink: the configured log file, or stderr when none could be opened.
struct LogSink {
    file: Option<Mutex<File>>,
}

impl LogSink {
    fn from_env() -> Self {
        let Ok(path) = std::env::var(constants::ENV_AEPCLI_LOG_FILE) else {
            return Self { file: None };
        };
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Self {
                file: Some(Mutex::new(file)),
            },
            Err(e) => {
                eprintln!("Warning: cannot open log file '{path}': {e}, logging to stderr");
                Self { file: None }
            }
        }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogSink {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        let cloned = self
            .file
            .as_ref()
            .and_then(|file| file.lock().ok())
            .and_then(|file| file.try_clone().ok());
        match cloned {
            Some(file) => Box::new(file),
            None => Box::new(std::io::stderr()),
        }
    }
}

/// `AEPCLI_LOG` when set, otherwise the `--log-level` value
fn filter_directive(level: LogLevel, env_value: Option<String>) -> String {
    env_value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| level.as_str().to_string())
}

/// Installs the global subscriber. Call once, before any request is made.
pub fn init_tracing(level: LogLevel) {
    let directive = filter_directive(level, std::env::var(constants::ENV_AEPCLI_LOG).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let sink = LogSink::from_env();

    match LogFormat::from_env() {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_span_list(false)
                .with_writer(sink);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Text => {
            let layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .without_time()
                .with_writer(sink);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}
