use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Named API aliases, one `[apis.<name>]` table each
    #[serde(default)]
    pub apis: BTreeMap<String, ApiAlias>,
}

/// A named API: where its document lives and how to talk to it
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ApiAlias {
    pub name: String,
    /// Local path (absolute, `~`-prefixed or relative to the config dir) or URL
    #[serde(default)]
    pub openapi_path: String,
    /// Overrides the server URL declared by the document
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_url: String,
    /// `key=value` headers sent with every request
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path_prefix: String,
}
