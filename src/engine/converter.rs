//! Rewrites a resolved API as an annotated `OpenAPI` 3.1 document.
//!
//! Every resource becomes a component schema carrying `x-aep-resource`,
//! plus the collection, item and custom-method paths for the methods it
//! supports. Resolving the output again yields the same resources.

use crate::constants;
use crate::engine::resolver::{Resource, ResourceGraph};
use crate::error::Error;
use crate::spec::{
    reference_name, Components, Info, MediaType, OpenApiDocument, Operation, Parameter,
    PathItem, RequestBody, ResourceAnnotation, Response, Schema, SchemaType, Server,
};
use crate::utils::placeholder_name;
use indexmap::IndexMap;

const OPENAPI_VERSION: &str = "3.1.0";
const COMPONENT_REF_PREFIX: &str = "#/components/schemas/";
const LIST_RESULTS_FIELD: &str = "results";
const LIST_TOKEN_FIELD: &str = "next_page_token";

fn typed(name: &str) -> Schema {
    Schema {
        schema_type: Some(SchemaType::Single(name.to_string())),
        ..Schema::default()
    }
}

fn component_ref(name: &str) -> Schema {
    Schema::reference_to(format!("{COMPONENT_REF_PREFIX}{name}"))
}

/// Points every `$ref` at `components/schemas`, whatever root it used before
fn rewrite_refs(schema: &mut Schema) {
    if let Some(reference) = schema.reference.take() {
        schema.reference = Some(format!("{COMPONENT_REF_PREFIX}{}", reference_name(&reference)));
    }
    if let Some(items) = schema.items.as_deref_mut() {
        rewrite_refs(items);
    }
    for property in schema.properties.values_mut() {
        rewrite_refs(property);
    }
}

fn json_content(content_type: &str, schema: Schema) -> IndexMap<String, MediaType> {
    IndexMap::from([(
        content_type.to_string(),
        MediaType {
            schema: Some(schema),
        },
    )])
}

fn ok_response(schema: Option<Schema>) -> IndexMap<String, Response> {
    IndexMap::from([(
        constants::STATUS_OK.to_string(),
        Response {
            description: "Successful response".to_string(),
            content: schema
                .map(|schema| json_content(constants::CONTENT_TYPE_JSON, schema))
                .unwrap_or_default(),
            schema: None,
        },
    )])
}

fn request_body(content_type: &str, schema: Schema) -> Option<RequestBody> {
    Some(RequestBody {
        content: json_content(content_type, schema),
        required: true,
        ..RequestBody::default()
    })
}

/// One required string path parameter per placeholder in `segments`
fn path_parameters(segments: &[String]) -> Vec<Parameter> {
    segments
        .iter()
        .filter_map(|segment| placeholder_name(segment))
        .map(|name| Parameter {
            name: name.to_string(),
            location: constants::PARAM_LOCATION_PATH.to_string(),
            required: true,
            schema: Some(typed(constants::TYPE_STRING)),
            ..Parameter::default()
        })
        .collect()
}

fn operation(
    summary: String,
    parameters: Vec<Parameter>,
    request_body: Option<RequestBody>,
    responses: IndexMap<String, Response>,
) -> Option<Operation> {
    Some(Operation {
        summary: Some(summary),
        parameters,
        responses,
        request_body,
        ..Operation::default()
    })
}

fn list_response(singular: &str) -> Schema {
    let mut results = typed(constants::TYPE_ARRAY);
    results.items = Some(Box::new(component_ref(singular)));
    let mut envelope = typed(constants::TYPE_OBJECT);
    envelope
        .properties
        .insert(LIST_RESULTS_FIELD.to_string(), results);
    envelope
        .properties
        .insert(LIST_TOKEN_FIELD.to_string(), typed(constants::TYPE_STRING));
    envelope
}

fn add_resource_paths(resource: &Resource, paths: &mut IndexMap<String, PathItem>) {
    let singular = resource.singular.as_str();
    let item_segments = resource.pattern.as_slice();
    let collection_segments = &item_segments[..item_segments.len() - 1];
    let methods = &resource.methods;

    if methods.list.is_some() || methods.create.is_some() {
        let mut collection = PathItem::default();
        if methods.list.is_some() {
            collection.get = operation(
                format!("List {}", resource.plural),
                path_parameters(collection_segments),
                None,
                ok_response(Some(list_response(singular))),
            );
        }
        if let Some(create) = methods.create {
            let mut parameters = path_parameters(collection_segments);
            if create.supports_user_settable_id {
                parameters.push(Parameter {
                    name: constants::QUERY_PARAM_ID.to_string(),
                    location: constants::PARAM_LOCATION_QUERY.to_string(),
                    schema: Some(typed(constants::TYPE_STRING)),
                    ..Parameter::default()
                });
            }
            collection.post = operation(
                format!("Create a {singular}"),
                parameters,
                request_body(constants::CONTENT_TYPE_JSON, component_ref(singular)),
                ok_response(Some(component_ref(singular))),
            );
        }
        paths.insert(format!("/{}", collection_segments.join("/")), collection);
    }

    let item_path = format!("/{}", resource.pattern_path());
    if methods.get.is_some() || methods.update.is_some() || methods.delete.is_some() {
        let mut item = PathItem::default();
        if methods.get.is_some() {
            item.get = operation(
                format!("Get a {singular}"),
                path_parameters(item_segments),
                None,
                ok_response(Some(component_ref(singular))),
            );
        }
        if methods.update.is_some() {
            item.patch = operation(
                format!("Update a {singular}"),
                path_parameters(item_segments),
                request_body(constants::CONTENT_TYPE_MERGE_PATCH, component_ref(singular)),
                ok_response(Some(component_ref(singular))),
            );
        }
        if methods.delete.is_some() {
            item.delete = operation(
                format!("Delete a {singular}"),
                path_parameters(item_segments),
                None,
                ok_response(None),
            );
        }
        paths.insert(item_path.clone(), item);
    }

    for custom in &resource.custom_methods {
        let mut request = custom.request.clone();
        let mut response = custom.response.clone();
        request.iter_mut().chain(response.iter_mut()).for_each(rewrite_refs);

        let op = operation(
            format!("{} a {singular}", custom.name),
            path_parameters(item_segments),
            request.and_then(|schema| request_body(constants::CONTENT_TYPE_JSON, schema)),
            ok_response(response),
        );
        let mut item = PathItem::default();
        match custom.method.as_str() {
            constants::HTTP_METHOD_GET => item.get = op,
            constants::HTTP_METHOD_PUT => item.put = op,
            constants::HTTP_METHOD_PATCH => item.patch = op,
            constants::HTTP_METHOD_DELETE => item.delete = op,
            _ => item.post = op,
        }
        paths.insert(format!("{item_path}:{}", custom.name), item);
    }
}

fn resource_schema(graph: &ResourceGraph, resource: &Resource) -> Schema {
    let mut schema = resource.schema.clone();
    rewrite_refs(&mut schema);
    let patterns = if resource.pattern.is_empty() {
        Vec::new()
    } else {
        vec![format!("/{}", resource.pattern_path())]
    };
    schema.aep_resource = Some(ResourceAnnotation {
        singular: resource.singular.clone(),
        plural: resource.plural.clone(),
        patterns,
        parents: graph
            .parents_of(resource)
            .map(|parent| parent.singular.clone())
            .collect(),
    });
    schema
}

/// Builds the annotated document for `graph`, resolved from `source`.
///
/// Every schema of `source` is carried over so nested references stay
/// valid. Resource schemas are stored under their singular name.
#[must_use]
pub fn to_annotated_document(graph: &ResourceGraph, source: &OpenApiDocument) -> OpenApiDocument {
    let mut schemas: IndexMap<String, Schema> = source
        .schemas()
        .iter()
        .map(|(name, schema)| {
            let mut schema = schema.clone();
            rewrite_refs(&mut schema);
            (name.clone(), schema)
        })
        .collect();
    let mut paths = IndexMap::new();

    for resource in graph.iter() {
        schemas.insert(resource.singular.clone(), resource_schema(graph, resource));
        if resource.pattern.is_empty() {
            tracing::warn!(
                resource = %resource.singular,
                "resource has no pattern; emitting its schema only"
            );
            continue;
        }
        add_resource_paths(resource, &mut paths);
    }

    OpenApiDocument {
        openapi: Some(OPENAPI_VERSION.to_string()),
        info: Info {
            title: source.info.title.clone(),
            description: source.info.description.clone(),
            version: source.info.version.clone(),
        },
        servers: vec![Server {
            url: graph.server_url.clone(),
            description: None,
        }],
        paths,
        components: Components { schemas },
        ..OpenApiDocument::default()
    }
}

/// Renders [`to_annotated_document`] as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the document cannot be serialized.
pub fn convert(graph: &ResourceGraph, source: &OpenApiDocument) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(&to_annotated_document(
        graph, source,
    ))?)
}
