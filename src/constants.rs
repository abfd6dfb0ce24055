//! String constants shared across aepcli

// HTTP Methods
pub const HTTP_METHOD_GET: &str = "GET";
pub const HTTP_METHOD_POST: &str = "POST";
pub const HTTP_METHOD_PUT: &str = "PUT";
pub const HTTP_METHOD_DELETE: &str = "DELETE";
pub const HTTP_METHOD_PATCH: &str = "PATCH";

// Content Types
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_MERGE_PATCH: &str = "application/merge-patch+json";

// OpenAPI document keys
pub const LEGACY_VERSION: &str = "2.0";
pub const PARAM_LOCATION_QUERY: &str = "query";
pub const PARAM_LOCATION_BODY: &str = "body";
pub const PARAM_LOCATION_PATH: &str = "path";
pub const STATUS_OK: &str = "200";

// Schema types
pub const TYPE_STRING: &str = "string";
pub const TYPE_INTEGER: &str = "integer";
pub const TYPE_NUMBER: &str = "number";
pub const TYPE_BOOLEAN: &str = "boolean";
pub const TYPE_ARRAY: &str = "array";
pub const TYPE_OBJECT: &str = "object";

// Resource command surface
pub const CMD_CREATE: &str = "create";
pub const CMD_GET: &str = "get";
pub const CMD_UPDATE: &str = "update";
pub const CMD_DELETE: &str = "delete";
pub const CMD_LIST: &str = "list";
pub const CUSTOM_METHOD_PREFIX: char = ':';
pub const ARG_DATA: &str = "@data";
pub const QUERY_PARAM_ID: &str = "id";
pub const PARENT_ID_SUFFIX: &str = "_id";

// Reserved top-level command
pub const CORE_COMMAND: &str = "core";

// Environment Variables
pub const ENV_AEPCLI_CONFIG_DIR: &str = "AEPCLI_CONFIG_DIR";
pub const ENV_AEPCLI_LOG: &str = "AEPCLI_LOG";
pub const ENV_AEPCLI_LOG_FORMAT: &str = "AEPCLI_LOG_FORMAT";
pub const ENV_AEPCLI_LOG_FILE: &str = "AEPCLI_LOG_FILE";

// Config
pub const CONFIG_FILENAME: &str = "config.toml";
pub const CONFIG_DIR_NAME: &str = "aepcli";

// Exit codes
pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_HTTP_ERROR_RESPONSE: i32 = 2;

// Error Context Messages
pub const ERR_CONNECTION: &str = "Check that the API server is running and accessible.";
pub const ERR_TIMEOUT: &str = "The API server may be slow or unresponsive. Try again later.";
pub const ERR_FILE_NOT_FOUND: &str = "Check that the file path is correct and the file exists.";
pub const ERR_PERMISSION: &str = "Check file permissions or run with appropriate privileges.";

/// Redacted placeholder for sensitive header values
pub const REDACTED: &str = "[REDACTED]";
