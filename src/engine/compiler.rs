//! Compiles resource invocations into HTTP requests
//!
//! [`compile`] parses argv against the clap command generated for a
//! resource, extracts a [`ResourceCall`] and hands it to
//! [`compile_request`], which validates it and builds the request.

use crate::constants;
use crate::engine::flags::read_data_file;
use crate::engine::generator::{
    bindable_inputs, build_resource_command, parent_flags, payload_schema, ID_ARG,
};
use crate::engine::resolver::Resource;
use crate::error::Error;
use crate::invocation::{Compiled, CompiledRequest, FieldValue, MethodCall, ResourceCall};
use clap::error::ErrorKind as ClapErrorKind;
use clap::parser::ValueSource;
use clap::ArgMatches;
use reqwest::Method;

/// Parses `args` (everything after the resource name) for `resource` and
/// compiles the request they describe.
///
/// A `--help` request, or a bare resource name, yields help text and no
/// request.
///
/// # Errors
///
/// Returns an error for unknown subcommands or flags, invalid flag values,
/// missing parents, ids or required fields, an unreadable or malformed
/// `--@data` file, and `--@data` combined with field flags.
pub fn compile<I, T>(resource: &Resource, args: I) -> Result<Compiled, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut command = build_resource_command(resource)?;
    let argv = std::iter::once(resource.singular.clone()).chain(args.into_iter().map(Into::into));

    let matches = match command.try_get_matches_from_mut(argv) {
        Ok(matches) => matches,
        Err(err) => {
            return match err.kind() {
                ClapErrorKind::DisplayHelp
                | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                | ClapErrorKind::DisplayVersion => Ok(Compiled {
                    request: None,
                    output: err.render().to_string(),
                }),
                _ => Err(Error::invalid_arguments(
                    &resource.singular,
                    clap_reason(&err),
                )),
            };
        }
    };

    let call = extract_call(resource, &matches)?;
    tracing::debug!(
        resource = %call.resource,
        method = ?call.method,
        "compiling resource call"
    );
    let request = compile_request(resource, &call)?;
    Ok(Compiled {
        request: Some(request),
        output: String::new(),
    })
}

/// First line of a clap error, without the `error: ` prefix
fn clap_reason(err: &clap::Error) -> String {
    let rendered = err.render().to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

/// Builds the [`ResourceCall`] described by parsed matches.
///
/// # Errors
///
/// Returns an error if the subcommand is unknown or `--@data` cannot be
/// read.
pub fn extract_call(resource: &Resource, matches: &ArgMatches) -> Result<ResourceCall, Error> {
    let Some((name, sub)) = matches.subcommand() else {
        return Err(Error::invalid_arguments(
            &resource.singular,
            "a method is required",
        ));
    };
    let method = MethodCall::from_command(name).ok_or_else(|| {
        Error::invalid_arguments(&resource.singular, format!("unknown method '{name}'"))
    })?;

    let mut call = ResourceCall::new(resource.singular.clone(), method);
    call.parents = parent_flags(resource)
        .iter()
        .map(|flag| {
            matches
                .try_get_one::<String>(flag)
                .ok()
                .flatten()
                .cloned()
                .unwrap_or_default()
        })
        .collect();
    call.id = sub.try_get_one::<String>(ID_ARG).ok().flatten().cloned();

    if let Some(schema) = payload_schema(resource, &call.method) {
        for input in bindable_inputs(resource, schema)? {
            let explicit = sub.value_source(&input.name) == Some(ValueSource::CommandLine);
            let value = sub.try_get_one::<FieldValue>(&input.name).ok().flatten();
            if let Some(value) = value.filter(|_| explicit) {
                call.fields.insert(input.name, value.clone());
            }
        }
    }
    if accepts_payload(resource, &call.method) {
        if let Some(path) = sub.try_get_one::<String>(constants::ARG_DATA).ok().flatten() {
            call.data = Some(read_data_file(path)?);
        }
    }
    Ok(call)
}

/// Whether the method sends a JSON body at all
fn accepts_payload(resource: &Resource, method: &MethodCall) -> bool {
    match method {
        MethodCall::Create | MethodCall::Update => true,
        MethodCall::Custom(name) => resource
            .custom_methods
            .iter()
            .any(|cm| &cm.name == name && cm.method == constants::HTTP_METHOD_POST),
        MethodCall::Get | MethodCall::Delete | MethodCall::List => false,
    }
}

/// Interleaves the resource pattern with the parent values, leaving out the
/// resource's own id placeholder.
fn path_prefix(resource: &Resource, parents: &[String]) -> String {
    let own_id = resource.pattern.len().saturating_sub(1);
    resource
        .pattern
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != own_id)
        .map(|(i, segment)| {
            if i % 2 == 0 {
                segment.as_str()
            } else {
                parents.get(i / 2).map_or("", String::as_str)
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn required_id<'a>(resource: &Resource, call: &'a ResourceCall) -> Result<&'a str, Error> {
    call.id
        .as_deref()
        .ok_or_else(|| Error::invalid_arguments(&resource.singular, "an id is required"))
}

fn json_body(call: &ResourceCall) -> Result<Vec<u8>, Error> {
    Ok(serde_json::to_vec(&call.payload())?)
}

/// Validates `call` against `resource` and builds the request it describes.
///
/// # Errors
///
/// Returns an error if the method is not supported by the resource, a parent
/// value, the id or a required field is missing, or `--@data` was combined
/// with field flags.
pub fn compile_request(resource: &Resource, call: &ResourceCall) -> Result<CompiledRequest, Error> {
    let flags = parent_flags(resource);
    let missing_parents: Vec<String> = flags
        .iter()
        .enumerate()
        .filter(|(i, _)| call.parents.get(*i).is_none_or(String::is_empty))
        .map(|(_, flag)| flag.clone())
        .collect();
    if !missing_parents.is_empty() {
        return Err(Error::missing_required_inputs(
            &resource.singular,
            &missing_parents,
        ));
    }

    if call.data.is_some() && !call.fields.is_empty() {
        let conflicting: Vec<String> = call.fields.keys().cloned().collect();
        return Err(Error::conflicting_inputs(&conflicting));
    }
    if call.data.is_none() {
        if let Some(schema) = payload_schema(resource, &call.method) {
            let missing: Vec<String> = bindable_inputs(resource, schema)?
                .into_iter()
                .filter(|input| input.required && !call.fields.contains_key(&input.name))
                .map(|input| input.name)
                .collect();
            if !missing.is_empty() {
                return Err(Error::missing_required_inputs(&resource.singular, &missing));
            }
        }
    }

    let prefix = path_prefix(resource, &call.parents);
    let unsupported = || {
        Error::invalid_arguments(
            &resource.singular,
            format!("method {:?} is not supported", call.method),
        )
    };

    let request = match &call.method {
        MethodCall::Create => {
            let create = resource.methods.create.ok_or_else(unsupported)?;
            let query = if create.supports_user_settable_id {
                let id = required_id(resource, call)?;
                Some(format!(
                    "{}={}",
                    constants::QUERY_PARAM_ID,
                    urlencoding::encode(id)
                ))
            } else {
                None
            };
            CompiledRequest {
                method: Method::POST,
                path: prefix,
                query,
                body: Some(json_body(call)?),
            }
        }
        MethodCall::Get => {
            resource.methods.get.ok_or_else(unsupported)?;
            CompiledRequest {
                method: Method::GET,
                path: format!("{prefix}/{}", required_id(resource, call)?),
                query: None,
                body: None,
            }
        }
        MethodCall::Update => {
            resource.methods.update.ok_or_else(unsupported)?;
            CompiledRequest {
                method: Method::PATCH,
                path: format!("{prefix}/{}", required_id(resource, call)?),
                query: None,
                body: Some(json_body(call)?),
            }
        }
        MethodCall::Delete => {
            resource.methods.delete.ok_or_else(unsupported)?;
            CompiledRequest {
                method: Method::DELETE,
                path: format!("{prefix}/{}", required_id(resource, call)?),
                query: None,
                body: None,
            }
        }
        MethodCall::List => {
            resource.methods.list.ok_or_else(unsupported)?;
            CompiledRequest {
                method: Method::GET,
                path: prefix,
                query: None,
                body: None,
            }
        }
        MethodCall::Custom(name) => {
            let custom = resource
                .custom_methods
                .iter()
                .find(|cm| &cm.name == name)
                .ok_or_else(unsupported)?;
            let method = Method::from_bytes(custom.method.as_bytes())
                .map_err(|e| Error::invalid_arguments(&resource.singular, e))?;
            let body = if method == Method::POST {
                Some(json_body(call)?)
            } else {
                None
            };
            CompiledRequest {
                method,
                path: format!("{prefix}/{}:{name}", required_id(resource, call)?),
                query: None,
                body,
            }
        }
    };
    Ok(request)
}
