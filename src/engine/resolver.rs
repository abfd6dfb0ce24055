//! Resource graph resolution
//!
//! Walks every path of an [`OpenApiDocument`] and infers the addressable
//! resources it exposes: their URL patterns, hierarchy, supported standard
//! methods and custom (`:verb`) methods. Resources declared through the
//! `x-aep-resource` annotation take their identity from the annotation;
//! everything else is inferred from path shape and schema names.

use crate::constants;
use crate::error::Error;
use crate::spec::{reference_name, OpenApiDocument, Operation, PathItem, Schema};
use crate::utils::{pascal_to_kebab_case, placeholder_name};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashSet};

/// Index of a [`Resource`] inside its [`ResourceGraph`]
pub type ResourceId = usize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetMethod;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListMethod;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateMethod {
    /// The collection accepts a caller-chosen id as the `id` query parameter
    pub supports_user_settable_id: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateMethod;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteMethod;

/// Standard methods a resource supports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Methods {
    pub get: Option<GetMethod>,
    pub list: Option<ListMethod>,
    pub create: Option<CreateMethod>,
    pub update: Option<UpdateMethod>,
    pub delete: Option<DeleteMethod>,
}

impl Methods {
    /// Merges methods discovered on another path. Presence only ever grows;
    /// a method already present keeps its first-seen settings.
    pub fn fold(&mut self, other: Self) {
        self.get = self.get.or(other.get);
        self.list = self.list.or(other.list);
        self.create = self.create.or(other.create);
        self.update = self.update.or(other.update);
        self.delete = self.delete.or(other.delete);
    }
}

/// A non-standard operation addressed as `<item path>:<name>`
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMethod {
    pub name: String,
    /// Upper-case HTTP verb
    pub method: String,
    pub request: Option<Schema>,
    pub response: Option<Schema>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub singular: String,
    pub plural: String,
    /// Alternating literal segments and `{placeholder}` segments, ending with
    /// the resource's own id placeholder
    pub pattern: Vec<String>,
    pub parents: Vec<ResourceId>,
    /// Dereferenced resource schema
    pub schema: Schema,
    pub methods: Methods,
    pub custom_methods: Vec<CustomMethod>,
}

impl Resource {
    /// The pattern as written in a URL template, without a leading slash
    #[must_use]
    pub fn pattern_path(&self) -> String {
        self.pattern.join("/")
    }

    /// Placeholder names of the parent segments, in path order
    pub fn parent_placeholders(&self) -> impl Iterator<Item = &str> {
        let own_id = self.pattern.len().saturating_sub(1);
        self.pattern
            .iter()
            .enumerate()
            .filter(move |(i, _)| i % 2 == 1 && *i != own_id)
            .filter_map(|(_, segment)| placeholder_name(segment))
    }
}

/// All resources exposed by one document plus the URL requests are sent to
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    pub server_url: String,
    resources: Vec<Resource>,
    by_singular: BTreeMap<String, ResourceId>,
}

impl ResourceGraph {
    #[must_use]
    pub fn resource(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(id)
    }

    #[must_use]
    pub fn id_of(&self, singular: &str) -> Option<ResourceId> {
        self.by_singular.get(singular).copied()
    }

    /// Looks up a resource by its singular name.
    ///
    /// # Errors
    ///
    /// Returns a validation error listing the available resources, with a
    /// "did you mean" hint when a close match exists.
    pub fn get_resource(&self, name: &str) -> Result<&Resource, Error> {
        if let Some(resource) = self.id_of(name).and_then(|id| self.resource(id)) {
            return Ok(resource);
        }
        let available: Vec<String> = self.names().map(str::to_string).collect();
        let suggestion = closest_match(name, &available);
        Err(Error::resource_not_found(
            name,
            &available,
            suggestion.as_deref(),
        ))
    }

    /// Singular names in lexical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_singular.keys().map(String::as_str)
    }

    /// Resources in lexical order of their singular names
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.by_singular.values().filter_map(|id| self.resources.get(*id))
    }

    pub fn parents_of<'a>(&'a self, resource: &'a Resource) -> impl Iterator<Item = &'a Resource> {
        resource
            .parents
            .iter()
            .filter_map(|id| self.resources.get(*id))
    }
}

fn closest_match(input: &str, candidates: &[String]) -> Option<String> {
    let matcher = SkimMatcherV2::default();
    candidates
        .iter()
        .filter_map(|candidate| {
            matcher
                .fuzzy_match(candidate, input)
                .map(|score| (score, candidate))
        })
        .max_by_key(|(score, _)| *score)
        .map(|(_, candidate)| candidate.clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    /// Ends with a placeholder: addresses one instance
    Item,
    /// Ends with a literal: addresses the whole set
    Collection,
}

/// Splits `path` into segments and checks that they alternate between
/// literals and placeholders, starting with a literal.
fn classify(path: &str) -> Option<(Vec<String>, PatternKind)> {
    let segments: Vec<String> = path
        .strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .map(str::to_string)
        .collect();
    if segments.iter().any(String::is_empty) {
        return None;
    }
    for (i, segment) in segments.iter().enumerate() {
        let wrapped = placeholder_name(segment).is_some();
        if wrapped != (i % 2 == 1) {
            return None;
        }
    }
    let kind = if segments.len() % 2 == 0 {
        PatternKind::Item
    } else {
        PatternKind::Collection
    };
    Some((segments, kind))
}

/// Splits `/a/{a}/b/{b}:name` into (`a/{a}/b/{b}`, `name`)
fn split_custom_method(path: &str) -> Option<(String, String)> {
    let (head, last) = path.rsplit_once('/').unwrap_or(("", path));
    let (segment, name) = last.split_once(constants::CUSTOM_METHOD_PREFIX)?;
    if name.is_empty() {
        return None;
    }
    let prefix = if head.is_empty() {
        segment.to_string()
    } else {
        format!("{head}/{segment}")
    };
    Some((
        prefix.trim_start_matches('/').to_string(),
        name.to_string(),
    ))
}

/// What a single path contributes to a resource
#[derive(Default)]
struct Discovery<'a> {
    methods: Methods,
    schema: Option<&'a Schema>,
}

struct Resolver<'a> {
    doc: &'a OpenApiDocument,
    resources: Vec<Resource>,
    by_singular: BTreeMap<String, ResourceId>,
    in_progress: HashSet<String>,
}

impl<'a> Resolver<'a> {
    fn new(doc: &'a OpenApiDocument) -> Self {
        Self {
            doc,
            resources: Vec::new(),
            by_singular: BTreeMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn response_schema(&self, operation: &'a Operation) -> Option<&'a Schema> {
        self.doc
            .schema_from_response(operation, constants::STATUS_OK)
            .or_else(|| {
                operation
                    .responses
                    .iter()
                    .find(|(code, _)| code.starts_with('2'))
                    .and_then(|(_, response)| self.doc.dialect().response_schema(response))
            })
    }

    fn scan_item(&self, item: &'a PathItem) -> Discovery<'a> {
        let mut found = Discovery::default();
        if item.delete.is_some() {
            found.methods.delete = Some(DeleteMethod);
        }
        if let Some(schema) = item.get.as_ref().and_then(|op| self.response_schema(op)) {
            found.methods.get = Some(GetMethod);
            found.schema = Some(schema);
        }
        if let Some(schema) = item.patch.as_ref().and_then(|op| self.response_schema(op)) {
            found.methods.update = Some(UpdateMethod);
            found.schema = found.schema.or(Some(schema));
        }
        found
    }

    fn scan_collection(&self, path: &str, item: &'a PathItem) -> Result<Discovery<'a>, Error> {
        let mut found = Discovery::default();
        if let Some(post) = &item.post {
            if let Some(schema) = self.response_schema(post) {
                found.methods.create = Some(CreateMethod {
                    supports_user_settable_id: post.has_query_parameter(constants::QUERY_PARAM_ID),
                });
                found.schema = Some(schema);
            }
        }
        if let Some(schema) = item.get.as_ref().and_then(|op| self.response_schema(op)) {
            let envelope = self.doc.dereference(schema)?;
            let items = envelope
                .properties
                .values()
                .find(|property| property.is_type(constants::TYPE_ARRAY))
                .and_then(|property| property.items.as_deref());
            match items {
                Some(items) => {
                    found.methods.list = Some(ListMethod);
                    found.schema = found.schema.or(Some(items));
                }
                None => tracing::warn!(
                    path,
                    "LIST response has no array property with an items schema; skipping list"
                ),
            }
        }
        Ok(found)
    }

    /// Returns the existing resource registered under `singular` or builds a
    /// new one from `schema`.
    fn get_or_populate(
        &mut self,
        singular: String,
        pattern: Vec<String>,
        schema: &'a Schema,
    ) -> Result<ResourceId, Error> {
        if let Some(&id) = self.by_singular.get(&singular) {
            let resource = &mut self.resources[id];
            if resource.pattern.is_empty() && !pattern.is_empty() {
                resource.plural = infer_plural(&pattern);
                resource.pattern = pattern;
            }
            return Ok(id);
        }

        let resource = match &schema.aep_resource {
            Some(annotation) => {
                if !self.in_progress.insert(singular.clone()) {
                    return Err(Error::circular_parent(&singular));
                }
                let mut parents = Vec::with_capacity(annotation.parents.len());
                for parent in &annotation.parents {
                    let parent_schema = self
                        .doc
                        .component(parent)
                        .ok_or_else(|| Error::parent_not_found(&singular, parent))?;
                    let parent_schema = self.doc.dereference(parent_schema)?;
                    let parent_singular = resource_singular(parent, parent_schema);
                    parents.push(self.get_or_populate(parent_singular, Vec::new(), parent_schema)?);
                }
                self.in_progress.remove(&singular);

                let pattern = annotation
                    .patterns
                    .first()
                    .map(|p| split_pattern(p))
                    .unwrap_or_default();
                let plural = if annotation.plural.is_empty() {
                    infer_plural(&pattern)
                } else {
                    annotation.plural.clone()
                };
                Resource {
                    singular: singular.clone(),
                    plural,
                    pattern,
                    parents,
                    schema: schema.clone(),
                    methods: Methods::default(),
                    custom_methods: Vec::new(),
                }
            }
            None => Resource {
                singular: singular.clone(),
                plural: infer_plural(&pattern),
                pattern,
                parents: Vec::new(),
                schema: schema.clone(),
                methods: Methods::default(),
                custom_methods: Vec::new(),
            },
        };

        tracing::debug!(
            resource = %resource.singular,
            pattern = %resource.pattern_path(),
            "discovered resource"
        );
        let id = self.resources.len();
        self.resources.push(resource);
        self.by_singular.insert(singular, id);
        Ok(id)
    }

    /// The custom method declared on a `:name` path. One verb is kept per
    /// name: POST when declared, otherwise the first verb found.
    fn custom_method(&self, item: &'a PathItem, name: &str) -> Result<Option<CustomMethod>, Error> {
        let declared: Vec<(&str, &Operation)> = item
            .http_methods_iter()
            .into_iter()
            .filter_map(|(verb, operation)| operation.as_ref().map(|op| (verb, op)))
            .collect();
        let Some(&(verb, operation)) = declared
            .iter()
            .find(|(verb, _)| *verb == constants::HTTP_METHOD_POST)
            .or_else(|| declared.first())
        else {
            return Ok(None);
        };
        for (ignored, _) in declared.iter().filter(|(other, _)| *other != verb) {
            tracing::warn!(
                method = name,
                kept = verb,
                ignored = *ignored,
                "custom method declares several verbs; keeping one"
            );
        }

        let request = if verb == constants::HTTP_METHOD_POST {
            self.doc
                .schema_from_request_body(operation)
                .map(|schema| self.doc.dereference(schema).cloned())
                .transpose()?
        } else {
            None
        };
        let response = self
            .response_schema(operation)
            .map(|schema| self.doc.dereference(schema).cloned())
            .transpose()?;
        Ok(Some(CustomMethod {
            name: name.to_string(),
            method: verb.to_string(),
            request,
            response,
        }))
    }
}

/// Identity of a resource schema: the annotation's singular when present,
/// otherwise the kebab-cased component name.
fn resource_singular(component: &str, schema: &Schema) -> String {
    schema
        .aep_resource
        .as_ref()
        .map(|annotation| annotation.singular.clone())
        .filter(|singular| !singular.is_empty())
        .unwrap_or_else(|| pascal_to_kebab_case(component))
}

fn split_pattern(pattern: &str) -> Vec<String> {
    pattern
        .trim_start_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// The collection literal right before the resource's own placeholder
fn infer_plural(pattern: &[String]) -> String {
    pattern
        .len()
        .checked_sub(2)
        .and_then(|i| pattern.get(i))
        .cloned()
        .unwrap_or_default()
}

/// Resolves every resource exposed by `doc`.
///
/// `path_prefix` is stripped from each document path before classification
/// and appended to the document's server URL. `server_url_override`, when
/// non-empty, is used verbatim instead.
///
/// # Errors
///
/// Fails on dangling or circular schema references, unknown annotated
/// parents, and when no server URL can be determined. No partial graph is
/// returned.
pub fn resolve(
    doc: &OpenApiDocument,
    server_url_override: Option<&str>,
    path_prefix: &str,
) -> Result<ResourceGraph, Error> {
    let mut resolver = Resolver::new(doc);
    let mut custom_buckets: IndexMap<String, Vec<CustomMethod>> = IndexMap::new();

    for (raw_path, item) in &doc.paths {
        let path = raw_path.strip_prefix(path_prefix).unwrap_or(raw_path);

        if let Some((prefix, name)) = split_custom_method(path) {
            if let Some(method) = resolver.custom_method(item, &name)? {
                let bucket = custom_buckets.entry(prefix).or_default();
                if bucket.iter().any(|existing| existing.name == method.name) {
                    tracing::warn!(
                        path = raw_path.as_str(),
                        "custom method already declared on another path; ignoring"
                    );
                } else {
                    bucket.push(method);
                }
            }
            continue;
        }

        let Some((mut pattern, kind)) = classify(path) else {
            tracing::debug!(path = raw_path.as_str(), "not a resource path, skipping");
            continue;
        };

        let discovery = match kind {
            PatternKind::Item => resolver.scan_item(item),
            PatternKind::Collection => resolver.scan_collection(path, item)?,
        };
        let Some(captured) = discovery.schema else {
            continue;
        };

        let Some(reference) = captured.reference.as_deref() else {
            if captured.aep_resource.is_none() {
                tracing::warn!(
                    path = raw_path.as_str(),
                    "inline response schema without a reference or annotation; cannot name resource"
                );
                continue;
            }
            let singular = resource_singular("", captured);
            let id = resolver.get_or_populate(singular, pattern, captured)?;
            resolver.resources[id].methods.fold(discovery.methods);
            continue;
        };

        let schema = doc.dereference(captured)?;
        let singular = resource_singular(reference_name(reference), schema);
        if kind == PatternKind::Collection && schema.aep_resource.is_none() {
            pattern.push(format!("{{{singular}}}"));
        }
        let id = resolver.get_or_populate(singular, pattern, schema)?;
        resolver.resources[id].methods.fold(discovery.methods);
    }

    for (prefix, methods) in custom_buckets {
        match resolver
            .resources
            .iter_mut()
            .find(|resource| resource.pattern_path() == prefix)
        {
            Some(resource) => resource.custom_methods.extend(methods),
            None => tracing::warn!(
                pattern = prefix.as_str(),
                "custom methods do not match any resource pattern; dropping them"
            ),
        }
    }

    let server_url = match server_url_override.filter(|url| !url.is_empty()) {
        Some(url) => url.to_string(),
        None => doc
            .declared_server_url()
            .map(|url| format!("{url}{path_prefix}"))
            .ok_or_else(Error::no_server_url)?,
    };

    Ok(ResourceGraph {
        server_url,
        resources: resolver.resources,
        by_singular: resolver.by_singular,
    })
}
