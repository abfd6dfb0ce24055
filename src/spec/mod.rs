//! In-memory `OpenAPI` document model
//!
//! Both the legacy (Swagger 2.0) and current (3.x) dialects deserialize into
//! the same [`OpenApiDocument`]. The few places where the dialects disagree
//! (definition root, where response and request body schemas live) are
//! answered by [`Dialect`], chosen once from the document root.

use crate::constants;
use crate::error::Error;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub mod parser;

pub use parser::{load_document, parse_document};

/// Maximum number of `$ref` hops followed before giving up
pub const MAX_REFERENCE_DEPTH: usize = 32;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiDocument {
    /// Present (as `"2.0"`) only on legacy documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swagger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openapi: Option<String>,
    #[serde(default)]
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
    /// Legacy definition root
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Schema>,
    /// Legacy server description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Server {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

/// A helper type to iterate over all HTTP methods in a `PathItem`
pub type HttpMethodsIter<'a> = [(&'static str, &'a Option<Operation>); 5];

impl PathItem {
    /// Pairs every supported HTTP verb with its (optional) operation
    #[must_use]
    pub const fn http_methods_iter(&self) -> HttpMethodsIter<'_> {
        [
            (constants::HTTP_METHOD_GET, &self.get),
            (constants::HTTP_METHOD_POST, &self.post),
            (constants::HTTP_METHOD_PUT, &self.put),
            (constants::HTTP_METHOD_PATCH, &self.patch),
            (constants::HTTP_METHOD_DELETE, &self.delete),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
}

impl Operation {
    /// Returns true if a query parameter with exactly this name is declared
    #[must_use]
    pub fn has_query_parameter(&self, name: &str) -> bool {
        self.parameters
            .iter()
            .any(|p| p.name == name && p.location == constants::PARAM_LOCATION_QUERY)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Query/path parameters carry their type here in 3.x and the body
    /// parameter carries the payload schema in 2.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct Response {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    /// Legacy responses carry the schema inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
    /// Legacy request bodies may carry the schema inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// `type` is a single string in 2.0/3.0 and may be a list in 3.1
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(
        rename = "x-aep-resource",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub aep_resource: Option<ResourceAnnotation>,
}

impl Schema {
    /// The effective type name, ignoring a `"null"` member of a 3.1 type list
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            SchemaType::Single(name) => Some(name.as_str()),
            SchemaType::Multiple(names) => names
                .iter()
                .map(String::as_str)
                .find(|name| *name != "null"),
        }
    }

    #[must_use]
    pub fn is_type(&self, name: &str) -> bool {
        self.type_name() == Some(name)
    }

    #[must_use]
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    /// Builds a reference schema pointing at a component by name
    #[must_use]
    pub fn reference_to(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Self::default()
        }
    }
}

/// The `x-aep-resource` vendor annotation
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ResourceAnnotation {
    #[serde(default)]
    pub singular: String,
    #[serde(default)]
    pub plural: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub parents: Vec<String>,
}

/// Which flavour of `OpenAPI` a document is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Swagger / `OpenAPI` 2.0
    Legacy,
    /// `OpenAPI` 3.x
    Current,
}

impl Dialect {
    /// Root map holding named schemas
    #[must_use]
    pub fn schema_root(self, doc: &OpenApiDocument) -> &IndexMap<String, Schema> {
        match self {
            Self::Legacy => &doc.definitions,
            Self::Current => &doc.components.schemas,
        }
    }

    /// Schema carried by a response, inline or under `application/json`
    #[must_use]
    pub fn response_schema(self, response: &Response) -> Option<&Schema> {
        match self {
            Self::Legacy => response.schema.as_ref(),
            Self::Current => response
                .content
                .get(constants::CONTENT_TYPE_JSON)
                .and_then(|media| media.schema.as_ref()),
        }
    }

    /// Request payload schema: the `in: body` parameter (or an inline
    /// `requestBody.schema`) in 2.0, `requestBody.content["application/json"]`
    /// in 3.x
    #[must_use]
    pub fn request_body_schema(self, operation: &Operation) -> Option<&Schema> {
        match self {
            Self::Legacy => operation
                .parameters
                .iter()
                .find(|p| p.location == constants::PARAM_LOCATION_BODY)
                .and_then(|p| p.schema.as_ref())
                .or_else(|| {
                    operation
                        .request_body
                        .as_ref()
                        .and_then(|body| body.schema.as_ref())
                }),
            Self::Current => operation
                .request_body
                .as_ref()
                .and_then(|body| body.content.get(constants::CONTENT_TYPE_JSON))
                .and_then(|media| media.schema.as_ref()),
        }
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// Returns the component name a `$ref` points at (its last path segment)
#[must_use]
pub fn reference_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

impl OpenApiDocument {
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        if self.swagger.as_deref() == Some(constants::LEGACY_VERSION) {
            Dialect::Legacy
        } else {
            Dialect::Current
        }
    }

    /// All named schemas of the document, regardless of dialect
    #[must_use]
    pub fn schemas(&self) -> &IndexMap<String, Schema> {
        self.dialect().schema_root(self)
    }

    /// Looks up a named schema component
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&Schema> {
        self.schemas().get(name)
    }

    /// Follows `$ref` links until a concrete schema is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced component does not exist or the
    /// references form a cycle.
    pub fn dereference<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, Error> {
        let mut visited = HashSet::new();
        let mut current = schema;
        while let Some(reference) = current.reference.as_deref() {
            if visited.len() >= MAX_REFERENCE_DEPTH || !visited.insert(reference) {
                return Err(Error::circular_reference(reference));
            }
            current = self
                .component(reference_name(reference))
                .ok_or_else(|| Error::schema_not_found(reference))?;
        }
        Ok(current)
    }

    /// Schema of the response for `status_code`, if the operation declares one
    #[must_use]
    pub fn schema_from_response<'a>(
        &'a self,
        operation: &'a Operation,
        status_code: &str,
    ) -> Option<&'a Schema> {
        operation
            .responses
            .get(status_code)
            .and_then(|response| self.dialect().response_schema(response))
    }

    /// Schema of the request payload, if the operation declares one
    #[must_use]
    pub fn schema_from_request_body<'a>(&'a self, operation: &'a Operation) -> Option<&'a Schema> {
        self.dialect().request_body_schema(operation)
    }

    /// Server URL declared by the document itself.
    ///
    /// Uses the first `servers` entry; legacy documents without one fall back
    /// to `<scheme>://<host><basePath>`. Trailing slashes are removed.
    #[must_use]
    pub fn declared_server_url(&self) -> Option<String> {
        if let Some(server) = self.servers.iter().find(|s| !s.url.is_empty()) {
            return Some(server.url.trim_end_matches('/').to_string());
        }
        if self.dialect() != Dialect::Legacy {
            return None;
        }
        let host = self.host.as_deref().filter(|h| !h.is_empty())?;
        let scheme = self.schemes.first().map_or("https", String::as_str);
        let base_path = self.base_path.as_deref().unwrap_or("");
        Some(format!(
            "{scheme}://{host}{}",
            base_path.trim_end_matches('/')
        ))
    }
}
