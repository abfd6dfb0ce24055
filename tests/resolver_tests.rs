
use aepcli::engine::compiler::compile;
use aepcli::engine::resolver::{resolve, CreateMethod};
use aepcli::error::ErrorKind;
use aepcli::spec::parse_document;
use reqwest::Method;
use serde_json::{json, Value};
use test_helpers::{bookstore_document, bookstore_graph};

#[test]
fn test_bookstore_resources_are_discovered() {
    let graph = bookstore_graph(None);
    assert_eq!(graph.server_url, "http://localhost:8081");
    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["book", "publisher"]);
}

#[test]
fn test_collection_and_item_paths_fold_into_one_resource() {
    let graph = bookstore_graph(None);
    let publisher = graph.get_resource("publisher").unwrap();
    let methods = publisher.methods;
    assert!(methods.get.is_some());
    assert!(methods.list.is_some());
    assert!(methods.update.is_some());
    assert!(methods.delete.is_some());
    assert_eq!(
        methods.create,
        Some(CreateMethod {
            supports_user_settable_id: true
        })
    );
    assert_eq!(publisher.plural, "publishers");
    assert_eq!(publisher.pattern, vec!["publishers", "{publisher}"]);
}

#[test]
fn test_same_singular_resolves_to_same_resource() {
    let graph = bookstore_graph(None);
    let book = graph.get_resource("book").unwrap();
    let publisher_id = graph.id_of("publisher").unwrap();
    assert_eq!(book.parents, vec![publisher_id]);
    assert_eq!(
        graph.resource(publisher_id).map(|r| r.singular.as_str()),
        Some("publisher")
    );
    assert_eq!(
        graph.parents_of(book).map(|r| r.singular.as_str()).collect::<Vec<_>>(),
        vec!["publisher"]
    );
}

#[test]
fn test_create_without_id_parameter_is_not_user_settable() {
    let graph = bookstore_graph(None);
    let book = graph.get_resource("book").unwrap();
    assert_eq!(
        book.methods.create,
        Some(CreateMethod {
            supports_user_settable_id: false
        })
    );
}

#[test]
fn test_custom_methods_attach_to_item_pattern() {
    let graph = bookstore_graph(None);
    let book = graph.get_resource("book").unwrap();
    let names: Vec<(&str, &str)> = book
        .custom_methods
        .iter()
        .map(|cm| (cm.name.as_str(), cm.method.as_str()))
        .collect();
    assert_eq!(names, vec![("archive", "POST"), ("stats", "GET")]);

    let archive = &book.custom_methods[0];
    let request = archive.request.as_ref().unwrap();
    assert!(request.properties.contains_key("reason"));
    assert!(request.is_required("reason"));
    assert!(book.custom_methods[1].request.is_none());
}

#[test]
fn test_server_url_override_wins() {
    let graph = bookstore_graph(Some("https://books.example.com"));
    assert_eq!(graph.server_url, "https://books.example.com");
}

#[test]
fn test_inferred_resource_without_annotation() {
    let doc = parse_document(
        r##"
openapi: 3.0.0
info: {title: datasets, version: "1"}
servers:
  - url: https://data.example.com/
paths:
  /projects/{project}/datasets:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  datasets:
                    type: array
                    items: {$ref: "#/components/schemas/Dataset"}
    post:
      responses:
        "201":
          description: created
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Dataset"}
  /projects/{project}/datasets/{dataset}:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Dataset"}
    delete:
      responses:
        "204": {description: deleted}
components:
  schemas:
    Dataset:
      type: object
      properties:
        display_name: {type: string}
"##,
    )
    .unwrap();

    let graph = resolve(&doc, None, "").unwrap();
    assert_eq!(graph.server_url, "https://data.example.com");
    let dataset = graph.get_resource("dataset").unwrap();
    assert_eq!(dataset.pattern, vec!["projects", "{project}", "datasets", "{dataset}"]);
    assert_eq!(dataset.plural, "datasets");
    assert!(dataset.methods.list.is_some());
    assert!(dataset.methods.create.is_some());
    assert!(dataset.methods.get.is_some());
    assert!(dataset.methods.delete.is_some());
    assert!(dataset.methods.update.is_none());
}

#[test]
fn test_legacy_document_server_and_schemas() {
    let doc = parse_document(
        r##"{
  "swagger": "2.0",
  "info": {"title": "legacy", "version": "1"},
  "host": "api.example.com",
  "basePath": "/v1",
  "schemes": ["https"],
  "paths": {
    "/shelves/{shelf}": {
      "get": {
        "responses": {
          "200": {"description": "ok", "schema": {"$ref": "#/definitions/Shelf"}}
        }
      }
    }
  },
  "definitions": {
    "Shelf": {"type": "object", "properties": {"theme": {"type": "string"}}}
  }
}"##,
    )
    .unwrap();

    let graph = resolve(&doc, None, "").unwrap();
    assert_eq!(graph.server_url, "https://api.example.com/v1");
    let shelf = graph.get_resource("shelf").unwrap();
    assert!(shelf.methods.get.is_some());
    assert!(shelf.schema.properties.contains_key("theme"));
}

#[test]
fn test_path_prefix_is_stripped_and_appended_to_server() {
    let content = test_helpers::BOOKSTORE_JSON.replace("    \"/publishers", "    \"/v1/publishers");
    let doc = parse_document(&content).unwrap();
    let graph = resolve(&doc, None, "/v1").unwrap();
    assert_eq!(graph.server_url, "http://localhost:8081/v1");
    let book = graph.get_resource("book").unwrap();
    assert_eq!(book.pattern_path(), "publishers/{publisher}/books/{book}");
    assert_eq!(book.custom_methods.len(), 2);
}

#[test]
fn test_missing_server_url_is_error() {
    let mut doc = bookstore_document();
    doc.servers.clear();
    let err = resolve(&doc, None, "").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Document));
    assert!(err.to_string().contains("no servers found"));

    assert!(resolve(&doc, Some("http://localhost:9000"), "").is_ok());
}

#[test]
fn test_unknown_annotated_parent_is_error() {
    let content = test_helpers::BOOKSTORE_JSON.replace(
        "\"parents\": [\"publisher\"]",
        "\"parents\": [\"library\"]",
    );
    let doc = parse_document(&content).unwrap();
    let err = resolve(&doc, None, "").unwrap_err();
    assert!(err.to_string().contains("parent \"library\" not found"));
}

#[test]
fn test_dangling_reference_is_error() {
    let content = test_helpers::BOOKSTORE_JSON.replace(
        "\"$ref\": \"#/components/schemas/book\"",
        "\"$ref\": \"#/components/schemas/novel\"",
    );
    let doc = parse_document(&content).unwrap();
    let err = resolve(&doc, None, "").unwrap_err();
    assert!(err
        .to_string()
        .contains("schema \"#/components/schemas/novel\" not found"));
}

#[test]
fn test_unknown_resource_lists_available_names() {
    let graph = bookstore_graph(None);
    let err = graph.get_resource("bok").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Resource \"bok\" not found"));
    assert!(message.contains("[book, publisher]"));
    assert_eq!(err.to_json().context.as_deref(), Some("Did you mean 'book'?"));
}

const WIDGETS_YAML: &str = r##"
openapi: 3.0.0
info: {title: widgets, version: "1"}
servers:
  - url: https://api.example.com/
paths:
  "/v1/widgets/{widget}":
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Widget"}
  "/v1/widgets/{widget}:spin":
    get:
      responses:
        "200": {description: ok}
    post:
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                speed: {type: integer}
      responses:
        "200": {description: ok}
  "/widgets/{widget}:spin":
    put:
      responses:
        "200": {description: ok}
components:
  schemas:
    Widget:
      type: object
      properties:
        color: {type: string}
"##;

#[test]
fn test_custom_method_keeps_one_verb_per_name() {
    let doc = parse_document(WIDGETS_YAML).unwrap();
    let graph = resolve(&doc, None, "/v1").unwrap();
    let widget = graph.get_resource("widget").unwrap();
    let methods: Vec<(&str, &str)> = widget
        .custom_methods
        .iter()
        .map(|cm| (cm.name.as_str(), cm.method.as_str()))
        .collect();
    assert_eq!(methods, vec![("spin", "POST")]);

    let spin = compile(widget, [":spin", "w1", "--speed=3"])
        .unwrap()
        .request
        .unwrap();
    assert_eq!(spin.method, Method::POST);
    assert_eq!(spin.path, "widgets/w1:spin");
    let body: Value = serde_json::from_slice(&spin.body.unwrap()).unwrap();
    assert_eq!(body, json!({"speed": 3}));

    let get = compile(widget, ["get", "w1"]).unwrap().request.unwrap();
    assert_eq!(get.path, "widgets/w1");
}

#[test]
fn test_server_trailing_slash_joins_path_prefix() {
    let doc = parse_document(WIDGETS_YAML).unwrap();
    let graph = resolve(&doc, None, "/v1").unwrap();
    assert_eq!(graph.server_url, "https://api.example.com/v1");
}

#[test]
fn test_list_needs_array_property() {
    let doc = parse_document(
        r##"
openapi: 3.0.0
info: {title: gizmos, version: "1"}
servers:
  - url: https://api.example.com
paths:
  /gizmos:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  count: {type: integer}
    post:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Gizmo"}
  "/gadgets/{gadget}:spin":
    post:
      responses:
        "200": {description: ok}
components:
  schemas:
    Gizmo:
      type: object
      properties:
        size: {type: integer}
"##,
    )
    .unwrap();

    let graph = resolve(&doc, None, "").unwrap();
    assert_eq!(graph.names().collect::<Vec<_>>(), vec!["gizmo"]);
    let gizmo = graph.get_resource("gizmo").unwrap();
    assert!(gizmo.methods.list.is_none());
    assert!(gizmo.methods.create.is_some());
    assert!(gizmo.custom_methods.is_empty());
}

#[test]
fn test_annotated_parent_cycle_is_error() {
    let doc = parse_document(
        r##"{
  "openapi": "3.1.0",
  "info": {"title": "cycle", "version": "1"},
  "servers": [{"url": "https://api.example.com"}],
  "paths": {
    "/alphas/{alpha}": {
      "get": {
        "responses": {
          "200": {
            "description": "ok",
            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/alpha"}}}
          }
        }
      }
    }
  },
  "components": {
    "schemas": {
      "alpha": {
        "type": "object",
        "x-aep-resource": {"singular": "alpha", "plural": "alphas", "patterns": ["/betas/{beta}/alphas/{alpha}"], "parents": ["beta"]}
      },
      "beta": {
        "type": "object",
        "x-aep-resource": {"singular": "beta", "plural": "betas", "patterns": ["/alphas/{alpha}/betas/{beta}"], "parents": ["alpha"]}
      }
    }
  }
}"##,
    )
    .unwrap();

    let err = resolve(&doc, None, "").unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Document));
    assert!(err.to_string().contains("resource \"alpha\" is its own ancestor"));
}

#[test]
fn test_first_schema_wins_for_same_singular() {
    let doc = parse_document(
        r##"
openapi: 3.0.0
info: {title: shelves, version: "1"}
servers:
  - url: https://api.example.com
paths:
  /shelves/{shelf}:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Shelf"}
  /stacks/{shelf}:
    patch:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: {$ref: "#/components/schemas/shelf"}
components:
  schemas:
    Shelf:
      type: object
      properties:
        theme: {type: string}
    shelf:
      type: object
      properties:
        color: {type: string}
"##,
    )
    .unwrap();

    let graph = resolve(&doc, None, "").unwrap();
    let shelf = graph.get_resource("shelf").unwrap();
    assert!(shelf.schema.properties.contains_key("theme"));
    assert!(!shelf.schema.properties.contains_key("color"));
    assert_eq!(shelf.pattern_path(), "shelves/{shelf}");
    assert!(shelf.methods.get.is_some());
    assert!(shelf.methods.update.is_some());
}
