//! Typed field inputs derived from resource schemas
//!
//! Every writable schema property becomes one `--<name>` flag. The flag's
//! [`FieldKind`] decides how the raw command-line string is parsed and how
//! the value lands in the JSON payload.

use crate::constants;
use crate::error::Error;
use crate::invocation::FieldValue;
use crate::spec::Schema;
use serde_json::{Map, Value};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    /// Comma separated, CSV quoting rules
    Array,
    /// Raw JSON value
    Json,
}

impl FieldKind {
    /// Maps a property schema onto the input kind used for it.
    ///
    /// # Errors
    ///
    /// Returns an error for an `array` property without an `items` schema.
    pub fn from_schema(field: &str, schema: &Schema) -> Result<Self, Error> {
        Ok(match schema.type_name() {
            Some(constants::TYPE_STRING) => Self::String,
            Some(constants::TYPE_INTEGER) => Self::Integer,
            Some(constants::TYPE_NUMBER) => Self::Number,
            Some(constants::TYPE_BOOLEAN) => Self::Boolean,
            Some(constants::TYPE_ARRAY) => {
                if schema.items.is_none() {
                    return Err(Error::array_without_items(field));
                }
                Self::Array
            }
            _ => Self::Json,
        })
    }

    /// Short value placeholder shown in help output
    #[must_use]
    pub const fn value_name(self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Integer => "INT",
            Self::Number => "FLOAT",
            Self::Boolean => "BOOL",
            Self::Array => "LIST",
            Self::Json => "JSON",
        }
    }
}

/// One writable property of a payload schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInput {
    pub name: String,
    pub kind: FieldKind,
    pub help: String,
    pub required: bool,
}

/// Lists the inputs for every non-`readOnly` property of `schema`, in
/// document order.
///
/// # Errors
///
/// Returns an error if an `array` property has no `items` schema.
pub fn field_inputs(schema: &Schema) -> Result<Vec<FieldInput>, Error> {
    schema
        .properties
        .iter()
        .filter(|(_, property)| !property.read_only)
        .map(|(name, property)| {
            let required = schema.is_required(name);
            let mut help = property
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| format!("The {name} of the resource"));
            if required {
                help.push_str(" (required)");
            }
            Ok(FieldInput {
                name: name.clone(),
                kind: FieldKind::from_schema(name, property)?,
                help,
                required,
            })
        })
        .collect()
}

/// Parses a raw flag value according to `kind`.
///
/// # Errors
///
/// Returns a human readable reason when the value does not fit the kind.
pub fn parse_field_value(kind: FieldKind, raw: &str) -> Result<FieldValue, String> {
    match kind {
        FieldKind::String => Ok(FieldValue::String(raw.to_string())),
        FieldKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|e| format!("invalid integer '{raw}': {e}")),
        FieldKind::Number => raw
            .trim()
            .parse::<f64>()
            .map(FieldValue::Number)
            .map_err(|e| format!("invalid number '{raw}': {e}")),
        FieldKind::Boolean => match raw.trim() {
            "" | "true" | "TRUE" | "True" | "1" => Ok(FieldValue::Boolean(true)),
            "false" | "FALSE" | "False" | "0" => Ok(FieldValue::Boolean(false)),
            other => Err(format!("invalid boolean '{other}'")),
        },
        FieldKind::Array => parse_list(raw).map(FieldValue::Array),
        FieldKind::Json => serde_json::from_str::<Value>(raw)
            .map(FieldValue::Json)
            .map_err(|e| format!("invalid JSON '{raw}': {e}")),
    }
}

/// Splits one comma separated record, honoring double-quoted fields with
/// `""` as an escaped quote. An empty input yields an empty list.
///
/// # Errors
///
/// Returns an error for an unterminated quoted field, a bare quote inside an
/// unquoted field, or text trailing a closing quote.
pub fn parse_list(input: &str) -> Result<Vec<String>, String> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut fields = Vec::new();
    let mut chars = input.chars().peekable();
    loop {
        let mut field = String::new();
        let last = if chars.next_if_eq(&'"').is_some() {
            loop {
                match chars.next() {
                    Some('"') if chars.next_if_eq(&'"').is_some() => field.push('"'),
                    Some('"') => break,
                    Some(c) => field.push(c),
                    None => return Err(format!("unterminated quoted field in '{input}'")),
                }
            }
            match chars.next() {
                None => true,
                Some(',') => false,
                Some(c) => return Err(format!("unexpected '{c}' after quoted field in '{input}'")),
            }
        } else {
            loop {
                match chars.next() {
                    None => break true,
                    Some(',') => break false,
                    Some('"') => return Err(format!("bare \" in non-quoted field in '{input}'")),
                    Some(c) => field.push(c),
                }
            }
        };
        fields.push(field);
        if last {
            return Ok(fields);
        }
    }
}

/// Reads the whole-payload override file given to `--@data`.
///
/// # Errors
///
/// Fails for an empty path, an unreadable file, malformed JSON (with line
/// and column) or a top-level value that is not an object.
pub fn read_data_file(path: &str) -> Result<Map<String, Value>, Error> {
    if path.is_empty() {
        return Err(Error::empty_data_path());
    }
    let content =
        std::fs::read_to_string(Path::new(path)).map_err(|e| Error::data_file_unreadable(path, &e))?;
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::data_not_object(path)),
        Err(e) => Err(Error::invalid_data_json(path, &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn schema(value: Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_list_quoting() {
        assert_eq!(
            parse_list(r#""tag1,",tag2,tag3"#).unwrap(),
            vec!["tag1,", "tag2", "tag3"]
        );
        assert_eq!(parse_list("a,b").unwrap(), vec!["a", "b"]);
        assert_eq!(parse_list("a,").unwrap(), vec!["a", ""]);
        assert_eq!(parse_list(r#""say ""hi""""#).unwrap(), vec![r#"say "hi""#]);
        assert!(parse_list("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_list_rejects_malformed_quotes() {
        assert!(parse_list(r#""open"#).is_err());
        assert!(parse_list(r#"a"b"#).is_err());
        assert!(parse_list(r#""a"b"#).is_err());
    }

    #[test]
    fn test_field_inputs_skip_read_only_and_mark_required() {
        // Parsed from text so property order matches the document.
        let s: Schema = serde_json::from_str(
            r#"{
                "type": "object",
                "required": ["title"],
                "properties": {
                    "path": {"type": "string", "readOnly": true},
                    "title": {"type": "string", "description": "Book title"},
                    "pages": {"type": "integer"},
                    "tags": {"type": "array", "items": {"type": "string"}},
                    "meta": {"type": "object"}
                }
            }"#,
        )
        .unwrap();
        let inputs = field_inputs(&s).unwrap();
        let names: Vec<&str> = inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["title", "pages", "tags", "meta"]);
        assert_eq!(inputs[0].help, "Book title (required)");
        assert!(inputs[0].required);
        assert_eq!(inputs[1].help, "The pages of the resource");
        assert_eq!(inputs[1].kind, FieldKind::Integer);
        assert_eq!(inputs[2].kind, FieldKind::Array);
        assert_eq!(inputs[3].kind, FieldKind::Json);
    }

    #[test]
    fn test_array_without_items_names_field() {
        let s = schema(json!({"properties": {"tags": {"type": "array"}}}));
        let err = field_inputs(&s).unwrap_err();
        assert!(err
            .to_string()
            .contains("items is required for array type, not found for field tags"));
    }

    #[test]
    fn test_parse_field_value() {
        assert_eq!(
            parse_field_value(FieldKind::Integer, "42").unwrap(),
            FieldValue::Integer(42)
        );
        assert!(parse_field_value(FieldKind::Integer, "4.2").is_err());
        assert_eq!(
            parse_field_value(FieldKind::Boolean, "false").unwrap(),
            FieldValue::Boolean(false)
        );
        assert_eq!(
            parse_field_value(FieldKind::Json, r#"{"a":1}"#).unwrap(),
            FieldValue::Json(json!({"a": 1}))
        );
    }

    #[test]
    fn test_read_data_file_errors() {
        assert!(read_data_file("")
            .unwrap_err()
            .to_string()
            .contains("filename cannot be empty"));

        let missing = read_data_file("/definitely/not/here.json").unwrap_err();
        assert!(missing
            .to_string()
            .contains("unable to read file '/definitely/not/here.json': no such file or directory"));

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "{{\n  \"title\": }}").unwrap();
        let path = bad.path().to_string_lossy().to_string();
        let message = read_data_file(&path).unwrap_err().to_string();
        assert!(message.contains(&format!("invalid JSON in '{path}'")));
        assert!(message.contains("at line 2, column"));
    }

    #[test]
    fn test_unreadable_data_file_names_permission_problem() {
        let denied = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = Error::data_file_unreadable("secret.json", &denied);
        assert_eq!(
            err.to_string(),
            "Input: unable to read file 'secret.json': permission denied"
        );
        assert_eq!(
            err.to_json().context.as_deref(),
            Some(crate::constants::ERR_PERMISSION)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_read_data_file_without_read_permission() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o000)).unwrap();
        let path = file.path().to_string_lossy().to_string();

        // root reads regardless of mode bits
        if std::fs::read(file.path()).is_ok() {
            return;
        }
        let message = read_data_file(&path).unwrap_err().to_string();
        assert!(message.contains(&format!("unable to read file '{path}': permission denied")));
    }

    #[test]
    fn test_read_data_file_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"title": "Test Book"}}"#).unwrap();
        let map = read_data_file(&file.path().to_string_lossy()).unwrap();
        assert_eq!(Value::Object(map), json!({"title": "Test Book"}));
    }
}
