use crate::constants;
use crate::engine::flags::{field_inputs, parse_field_value, FieldInput, FieldKind};
use crate::engine::resolver::{CustomMethod, Resource};
use crate::error::Error;
use crate::invocation::MethodCall;
use crate::spec::Schema;
use crate::utils::capitalize_first;
use clap::{Arg, ArgAction, Command};

/// Arg id of the positional resource id
pub const ID_ARG: &str = "@id";

/// Flag names clap or the payload override already own
const RESERVED_FLAGS: &[&str] = &["help", constants::ARG_DATA];

/// Converts a String to a 'static str by leaking it
///
/// This is necessary for clap's API which requires 'static strings.
/// In a CLI context, this is acceptable as the program runs once and exits.
fn to_static_str(s: String) -> &'static str {
    Box::leak(s.into_boxed_str())
}

/// Flag name for a parent placeholder: `publisher_id` becomes `publisher`
#[must_use]
pub fn parent_flag_name(placeholder: &str) -> &str {
    placeholder
        .strip_suffix(constants::PARENT_ID_SUFFIX)
        .filter(|name| !name.is_empty())
        .unwrap_or(placeholder)
}

/// Parent flag names of a resource, in path order
#[must_use]
pub fn parent_flags(resource: &Resource) -> Vec<String> {
    resource
        .parent_placeholders()
        .map(|placeholder| parent_flag_name(placeholder).to_string())
        .collect()
}

fn find_custom<'a>(resource: &'a Resource, name: &str) -> Option<&'a CustomMethod> {
    resource.custom_methods.iter().find(|cm| cm.name == name)
}

/// Schema whose properties become field flags for `method`, if any
#[must_use]
pub fn payload_schema<'a>(resource: &'a Resource, method: &MethodCall) -> Option<&'a Schema> {
    match method {
        MethodCall::Create | MethodCall::Update => Some(&resource.schema),
        MethodCall::Custom(name) => find_custom(resource, name)
            .filter(|cm| cm.method == constants::HTTP_METHOD_POST)
            .and_then(|cm| cm.request.as_ref()),
        MethodCall::Get | MethodCall::Delete | MethodCall::List => None,
    }
}

/// Field inputs of `schema` that can be bound as flags on `resource`.
///
/// Properties whose name collides with a parent flag or a reserved flag are
/// left out and have to be supplied through `--@data`.
///
/// # Errors
///
/// Returns an error if an `array` property has no `items` schema.
pub fn bindable_inputs(resource: &Resource, schema: &Schema) -> Result<Vec<FieldInput>, Error> {
    let parents = parent_flags(resource);
    let mut inputs = field_inputs(schema)?;
    inputs.retain(|input| {
        let taken = RESERVED_FLAGS.contains(&input.name.as_str()) || parents.contains(&input.name);
        if taken {
            tracing::warn!(
                resource = %resource.singular,
                field = %input.name,
                "field name collides with another flag; only settable through --@data"
            );
        }
        !taken
    });
    Ok(inputs)
}

fn id_arg() -> Arg {
    Arg::new(ID_ARG)
        .value_name("ID")
        .help("The id of the resource")
        .required(true)
        .action(ArgAction::Set)
}

fn data_arg() -> Arg {
    Arg::new(constants::ARG_DATA)
        .long(constants::ARG_DATA)
        .value_name("FILE")
        .help("Read the whole request body from a JSON file")
        .action(ArgAction::Set)
}

fn field_arg(input: &FieldInput) -> Arg {
    let name = to_static_str(input.name.clone());
    let kind = input.kind;
    let arg = Arg::new(name)
        .long(name)
        .help(input.help.clone())
        .value_name(kind.value_name())
        .value_parser(move |raw: &str| parse_field_value(kind, raw))
        .action(ArgAction::Set);

    if kind == FieldKind::Boolean {
        arg.num_args(0..=1)
            .require_equals(true)
            .default_missing_value("true")
    } else {
        arg
    }
}

fn with_payload_args(
    mut command: Command,
    resource: &Resource,
    schema: Option<&Schema>,
) -> Result<Command, Error> {
    if let Some(schema) = schema {
        for input in bindable_inputs(resource, schema)? {
            command = command.arg(field_arg(&input));
        }
    }
    Ok(command.arg(data_arg()))
}

/// Builds the clap command for one resource.
///
/// Parent flags are global so they may appear before or after the method.
/// Each supported method becomes a subcommand; custom methods are named
/// `:<name>`.
///
/// # Errors
///
/// Returns an error if a payload schema declares an `array` property
/// without `items`.
pub fn build_resource_command(resource: &Resource) -> Result<Command, Error> {
    let singular = resource.singular.as_str();
    let mut command = Command::new(to_static_str(resource.singular.clone()))
        .about(format!("Manage {singular} resources"))
        .subcommand_required(true)
        .arg_required_else_help(true);

    for flag in parent_flags(resource) {
        let help = format!("The {flag} of the resource (required)");
        let value_name = to_static_str(flag.to_uppercase());
        let flag = to_static_str(flag);
        command = command.arg(
            Arg::new(flag)
                .long(flag)
                .help(help)
                .value_name(value_name)
                .global(true)
                .action(ArgAction::Set),
        );
    }

    let methods = &resource.methods;
    if let Some(create) = methods.create {
        let mut create_cmd =
            Command::new(constants::CMD_CREATE).about(format!("Create a {singular}"));
        if create.supports_user_settable_id {
            create_cmd = create_cmd.arg(id_arg());
        }
        command = command.subcommand(with_payload_args(
            create_cmd,
            resource,
            Some(&resource.schema),
        )?);
    }
    if methods.get.is_some() {
        command = command.subcommand(
            Command::new(constants::CMD_GET)
                .about(format!("Get a {singular}"))
                .arg(id_arg()),
        );
    }
    if methods.update.is_some() {
        let update_cmd = Command::new(constants::CMD_UPDATE)
            .about(format!("Update a {singular}"))
            .arg(id_arg());
        command = command.subcommand(with_payload_args(
            update_cmd,
            resource,
            Some(&resource.schema),
        )?);
    }
    if methods.delete.is_some() {
        command = command.subcommand(
            Command::new(constants::CMD_DELETE)
                .about(format!("Delete a {singular}"))
                .arg(id_arg()),
        );
    }
    if methods.list.is_some() {
        let plural = if resource.plural.is_empty() {
            singular
        } else {
            resource.plural.as_str()
        };
        command = command.subcommand(
            Command::new(constants::CMD_LIST).about(format!("List {plural}")),
        );
    }

    for custom in &resource.custom_methods {
        let name = format!("{}{}", constants::CUSTOM_METHOD_PREFIX, custom.name);
        let custom_cmd = Command::new(to_static_str(name))
            .about(format!(
                "{} a {singular}",
                capitalize_first(&custom.method.to_lowercase())
            ))
            .arg(id_arg());
        let custom_cmd = if custom.method == constants::HTTP_METHOD_POST {
            with_payload_args(custom_cmd, resource, custom.request.as_ref())?
        } else {
            custom_cmd
        };
        command = command.subcommand(custom_cmd);
    }

    Ok(command)
}
